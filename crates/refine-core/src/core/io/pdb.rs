use super::traits::StructureFile;
use crate::core::geometry::{BackboneAtoms, build_backbone, dihedral};
use crate::core::models::conformation::Conformation;
use crate::core::models::residue::{Residue, TRANS_OMEGA, expected_chi_count};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use std::ops::Range;
use thiserror::Error;
use tracing::warn;

const CHAIN_ID: char = 'A';
const UNNAMED: &str = "unnamed";
/// Torsions a chain terminus does not define; the extended value.
const TERMINAL_TORSION: f64 = 180.0;
/// C(i)-N(i+1) distances beyond this are reported as chain breaks.
const PEPTIDE_BOND_CUTOFF: f64 = 2.0;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line}: malformed ATOM record ({reason})")]
    Malformed { line: usize, reason: String },
    #[error("Residue {index} ({name}): missing backbone atom '{atom}'")]
    MissingAtom {
        index: usize,
        name: String,
        atom: &'static str,
    },
    #[error("Residue {index}: unknown residue name '{name}'")]
    UnknownResidue { index: usize, name: String },
    #[error("File contains no ATOM records")]
    Empty,
}

/// Backbone-only PDB.
///
/// Reading keeps the N, CA and C atoms of the first model and derives phi, psi and
/// omega from them; chi angles are not recovered and start at 180. Writing emits the
/// backbone built from the torsions, so a written file reads back to the same backbone.
pub struct PdbFile;

#[derive(Default)]
struct ResidueAtoms {
    name: String,
    n: Option<Point3<f64>>,
    ca: Option<Point3<f64>>,
    c: Option<Point3<f64>>,
}

fn column(line: &str, range: Range<usize>) -> &str {
    line.get(range).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, number: usize, range: Range<usize>) -> Result<f64, PdbError> {
    let field = column(line, range);
    field.parse().map_err(|_| PdbError::Malformed {
        line: number,
        reason: format!("invalid coordinate '{field}'"),
    })
}

fn atom_line(
    serial: usize,
    atom_name: &str,
    res_name: &str,
    res_seq: usize,
    coords: [f64; 3],
    element: &str,
) -> String {
    format!(
        "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
        serial,
        atom_name,
        res_name,
        CHAIN_ID,
        res_seq,
        coords[0],
        coords[1],
        coords[2],
        1.0,
        0.0,
        element
    )
}

fn into_backbone(index: usize, atoms: ResidueAtoms) -> Result<(String, BackboneAtoms), PdbError> {
    let missing = |atom: &'static str| PdbError::MissingAtom {
        index,
        name: atoms.name.clone(),
        atom,
    };
    let n = atoms.n.ok_or_else(|| missing("N"))?;
    let ca = atoms.ca.ok_or_else(|| missing("CA"))?;
    let c = atoms.c.ok_or_else(|| missing("C"))?;
    Ok((atoms.name, BackboneAtoms { n, ca, c }))
}

/// Derives torsion-space residues from consecutive backbone atoms.
fn residues_from_backbone(chain: &[(String, BackboneAtoms)]) -> Result<Vec<Residue>, PdbError> {
    let mut residues = Vec::with_capacity(chain.len());
    for (i, (name, atoms)) in chain.iter().enumerate() {
        let chi_count = expected_chi_count(name).ok_or_else(|| PdbError::UnknownResidue {
            index: i + 1,
            name: name.clone(),
        })?;

        let phi = match i.checked_sub(1).map(|p| &chain[p].1) {
            Some(prev) => dihedral(&prev.c, &atoms.n, &atoms.ca, &atoms.c),
            None => TERMINAL_TORSION,
        };
        let (psi, omega) = match chain.get(i + 1).map(|(_, next)| next) {
            Some(next) => {
                let bond = (next.n - atoms.c).norm();
                if bond > PEPTIDE_BOND_CUTOFF {
                    warn!(residue = i + 1, bond, "Chain break between consecutive residues.");
                }
                (
                    dihedral(&atoms.n, &atoms.ca, &atoms.c, &next.n),
                    dihedral(&atoms.ca, &atoms.c, &next.n, &next.ca),
                )
            }
            None => (TERMINAL_TORSION, TRANS_OMEGA),
        };

        residues.push(
            Residue::new(name, phi, psi)
                .with_omega(omega)
                .with_chi(vec![180.0; chi_count]),
        );
    }
    Ok(residues)
}

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Conformation, Self::Error> {
        let mut name = None;
        let mut chain: Vec<(String, BackboneAtoms)> = Vec::new();
        let mut current: Option<(String, ResidueAtoms)> = None;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let number = i + 1;

            if line.starts_with("TITLE") && name.is_none() {
                let title = column(&line, 10..line.len());
                if !title.is_empty() {
                    name = Some(title.to_string());
                }
                continue;
            }
            if line.starts_with("ENDMDL") {
                break;
            }
            if !line.starts_with("ATOM  ") {
                continue;
            }
            if line.len() < 54 {
                return Err(PdbError::Malformed {
                    line: number,
                    reason: "record shorter than the coordinate columns".to_string(),
                });
            }

            let alt_loc = column(&line, 16..17);
            if !(alt_loc.is_empty() || alt_loc == "A") {
                continue;
            }

            let atom_name = column(&line, 12..16);
            let res_name = column(&line, 17..20).to_ascii_uppercase();
            let key = format!("{}:{}", column(&line, 21..22), column(&line, 22..27));
            if column(&line, 22..26).parse::<i64>().is_err() {
                return Err(PdbError::Malformed {
                    line: number,
                    reason: format!("invalid residue number '{}'", column(&line, 22..26)),
                });
            }
            let point = Point3::new(
                parse_coordinate(&line, number, 30..38)?,
                parse_coordinate(&line, number, 38..46)?,
                parse_coordinate(&line, number, 46..54)?,
            );

            if current.as_ref().is_none_or(|(k, _)| *k != key) {
                if let Some((_, atoms)) = current.take() {
                    chain.push(into_backbone(chain.len() + 1, atoms)?);
                }
                current = Some((
                    key,
                    ResidueAtoms {
                        name: res_name,
                        ..ResidueAtoms::default()
                    },
                ));
            }

            if let Some((_, atoms)) = current.as_mut() {
                match atom_name {
                    "N" => atoms.n = Some(point),
                    "CA" => atoms.ca = Some(point),
                    "C" => atoms.c = Some(point),
                    _ => {}
                }
            }
        }

        if let Some((_, atoms)) = current.take() {
            chain.push(into_backbone(chain.len() + 1, atoms)?);
        }
        if chain.is_empty() {
            return Err(PdbError::Empty);
        }

        let residues = residues_from_backbone(&chain)?;
        Ok(Conformation::new(
            name.unwrap_or_else(|| UNNAMED.to_string()),
            residues,
        ))
    }

    /// Writes backbone N, CA and C coordinates built from the torsions.
    fn write_to(conformation: &Conformation, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "TITLE     {}", conformation.name())?;

        let backbone = build_backbone(conformation);
        let mut serial = 1;
        for (i, (residue, atoms)) in conformation.residues().iter().zip(&backbone).enumerate() {
            for (name, point, element) in [
                (" N", &atoms.n, "N"),
                (" CA", &atoms.ca, "C"),
                (" C", &atoms.c, "C"),
            ] {
                let line = atom_line(
                    serial,
                    name,
                    &residue.name,
                    i + 1,
                    [point.x, point.y, point.z],
                    element,
                );
                writeln!(writer, "{line}")?;
                serial += 1;
            }
        }

        if let Some(last) = conformation.residues().last() {
            writeln!(
                writer,
                "TER   {:>5}      {:>3} {}{:>4}",
                serial,
                last.name,
                CHAIN_ID,
                conformation.len()
            )?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{angle_difference, ca_rmsd};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn tripeptide() -> Conformation {
        Conformation::new(
            "tripeptide",
            vec![
                Residue::new("ALA", -63.0, -43.0),
                Residue::new("SER", -120.0, 130.0).with_chi(vec![60.0]),
                Residue::new("GLY", 75.0, 20.0).with_omega(175.0),
                Residue::new("LYS", -65.0, -35.0),
            ],
        )
    }

    fn render(conformation: &Conformation) -> String {
        let mut buffer = Vec::new();
        PdbFile::write_to(conformation, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn read(text: &str) -> Result<Conformation, PdbError> {
        PdbFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn writes_three_atoms_per_residue_plus_title_ter_and_end() {
        let text = render(&tripeptide());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 12 + 1 + 1);
        assert_eq!(lines[0], "TITLE     tripeptide");
        assert!(lines[13].starts_with("TER"));
        assert_eq!(lines[14], "END");
    }

    #[test]
    fn atom_records_use_fixed_pdb_columns() {
        let text = render(&tripeptide());
        let ca_line = text.lines().nth(2).unwrap();
        assert_eq!(&ca_line[0..6], "ATOM  ");
        assert_eq!(ca_line[6..11].trim(), "2");
        assert_eq!(&ca_line[12..16], " CA ");
        assert_eq!(&ca_line[17..20], "ALA");
        assert_eq!(&ca_line[21..22], "A");
        assert_eq!(ca_line[22..26].trim(), "1");
        let x: f64 = ca_line[30..38].trim().parse().unwrap();
        assert!((x - 1.458).abs() < 1e-3);
        assert_eq!(ca_line[76..78].trim(), "C");
    }

    #[test]
    fn empty_conformation_writes_only_title_and_end() {
        let text = render(&Conformation::new("empty", vec![]));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn written_backbone_reads_back_to_the_same_torsions() {
        let original = tripeptide();
        let pose = read(&render(&original)).unwrap();

        assert_eq!(pose.name(), "tripeptide");
        assert_eq!(pose.sequence(), original.sequence());
        let n = pose.len();
        for (i, (got, want)) in pose.residues().iter().zip(original.residues()).enumerate() {
            if i > 0 {
                assert!(angle_difference(got.phi, want.phi).abs() < 0.5, "phi {i}");
            }
            if i + 1 < n {
                assert!(angle_difference(got.psi, want.psi).abs() < 0.5, "psi {i}");
                assert!(angle_difference(got.omega, want.omega).abs() < 0.5, "omega {i}");
            }
        }
        assert!(ca_rmsd(&original, &pose).unwrap() < 0.05);
    }

    #[test]
    fn termini_and_side_chains_take_default_torsions() {
        let pose = read(&render(&tripeptide())).unwrap();
        let first = &pose.residues()[0];
        let last = &pose.residues()[3];
        assert_eq!(first.phi, TERMINAL_TORSION);
        assert_eq!(last.psi, TERMINAL_TORSION);
        assert_eq!(last.omega, TRANS_OMEGA);
        assert_eq!(pose.residues()[1].chi, vec![180.0]);
        assert_eq!(last.chi, vec![180.0; 4]);
    }

    #[test]
    fn path_round_trip_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decoy.pdb");
        PdbFile::write_to_path(&tripeptide(), &path).unwrap();
        let pose = PdbFile::read_from_path(&path).unwrap();
        assert_eq!(pose.len(), 4);
    }

    #[test]
    fn side_chain_atoms_hetero_records_and_later_models_are_ignored() {
        let text = concat!(
            "HEADER    TEST\n",
            "ATOM      1  N   ALA A   1       0.000   0.000   0.000  1.00  0.00           N\n",
            "ATOM      2  CA  ALA A   1       1.458   0.000   0.000  1.00  0.00           C\n",
            "ATOM      3  C   ALA A   1       2.009   1.420   0.000  1.00  0.00           C\n",
            "ATOM      4  CB  ALA A   1       1.900  -0.700   1.200  1.00  0.00           C\n",
            "HETATM    5  O   HOH A 101       9.000   9.000   9.000  1.00  0.00           O\n",
            "ENDMDL\n",
            "ATOM      6  N   GLY A   2       3.000   2.000   0.000  1.00  0.00           N\n",
        );
        let pose = read(text).unwrap();
        assert_eq!(pose.name(), UNNAMED);
        assert_eq!(pose.sequence(), "A");
    }

    #[test]
    fn truncated_record_is_malformed() {
        let text = "ATOM      1  N   ALA A   1       0.000   0.000\n";
        assert!(matches!(read(text), Err(PdbError::Malformed { line: 1, .. })));
    }

    #[test]
    fn non_numeric_coordinate_is_malformed() {
        let text =
            "ATOM      1  N   ALA A   1       0.000   abcde   0.000  1.00  0.00           N\n";
        let err = read(text).unwrap_err();
        assert!(matches!(err, PdbError::Malformed { line: 1, .. }));
        assert!(err.to_string().contains("abcde"));
    }

    #[test]
    fn residue_without_carbonyl_carbon_is_rejected() {
        let text = concat!(
            "ATOM      1  N   ALA A   1       0.000   0.000   0.000  1.00  0.00           N\n",
            "ATOM      2  CA  ALA A   1       1.458   0.000   0.000  1.00  0.00           C\n",
        );
        assert!(matches!(
            read(text),
            Err(PdbError::MissingAtom { index: 1, atom: "C", .. })
        ));
    }

    #[test]
    fn unknown_residue_and_empty_files_are_rejected() {
        let text = concat!(
            "ATOM      1  N   XYZ A   1       0.000   0.000   0.000  1.00  0.00           N\n",
            "ATOM      2  CA  XYZ A   1       1.458   0.000   0.000  1.00  0.00           C\n",
            "ATOM      3  C   XYZ A   1       2.009   1.420   0.000  1.00  0.00           C\n",
        );
        assert!(matches!(read(text), Err(PdbError::UnknownResidue { index: 1, .. })));
        assert!(matches!(read("REMARK nothing here\nEND\n"), Err(PdbError::Empty)));
    }
}
