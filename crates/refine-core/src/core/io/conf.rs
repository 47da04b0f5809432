use super::traits::StructureFile;
use crate::core::geometry::wrap_degrees;
use crate::core::models::conformation::Conformation;
use crate::core::models::residue::{Residue, expected_chi_count};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

const UNNAMED: &str = "unnamed";

#[derive(Debug, Error)]
pub enum ConfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Conformation contains no residues")]
    Empty,
    #[error("Residue {index}: unknown residue name '{name}'")]
    UnknownResidue { index: usize, name: String },
    #[error("Residue {index} ({name}): expected {expected} chi angle(s), found {found}")]
    ChiCount {
        index: usize,
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Residue {index}: torsion '{torsion}' is not a finite number")]
    InvalidTorsion { index: usize, torsion: &'static str },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfDocument {
    #[serde(default)]
    name: Option<String>,
    residues: Vec<Residue>,
}

#[derive(Serialize)]
struct ConfDocumentRef<'a> {
    name: &'a str,
    residues: &'a [Residue],
}

/// Torsion-space conformation file in TOML.
///
/// ```toml
/// name = "peptide"
///
/// [[residues]]
/// name = "SER"
/// phi = -63.0
/// psi = -43.0
/// omega = 180.0   # optional, trans by default
/// chi = [60.0]    # optional, 180 for every chi by default
/// ```
pub struct ConfFile;

fn validate_residue(index: usize, mut residue: Residue) -> Result<Residue, ConfError> {
    residue.name = residue.name.trim().to_ascii_uppercase();
    let expected =
        expected_chi_count(&residue.name).ok_or_else(|| ConfError::UnknownResidue {
            index,
            name: residue.name.clone(),
        })?;

    if residue.chi.is_empty() {
        residue.chi = vec![180.0; expected];
    } else if residue.chi.len() != expected {
        return Err(ConfError::ChiCount {
            index,
            name: residue.name,
            expected,
            found: residue.chi.len(),
        });
    }

    for (label, value) in [
        ("phi", residue.phi),
        ("psi", residue.psi),
        ("omega", residue.omega),
    ] {
        if !value.is_finite() {
            return Err(ConfError::InvalidTorsion {
                index,
                torsion: label,
            });
        }
    }
    if residue.chi.iter().any(|c| !c.is_finite()) {
        return Err(ConfError::InvalidTorsion {
            index,
            torsion: "chi",
        });
    }

    residue.phi = wrap_degrees(residue.phi);
    residue.psi = wrap_degrees(residue.psi);
    residue.omega = wrap_degrees(residue.omega);
    for chi in &mut residue.chi {
        *chi = wrap_degrees(*chi);
    }
    Ok(residue)
}

impl StructureFile for ConfFile {
    type Error = ConfError;

    fn read_from(reader: &mut impl BufRead) -> Result<Conformation, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let document: ConfDocument = toml::from_str(&content)?;

        if document.residues.is_empty() {
            return Err(ConfError::Empty);
        }

        let residues = document
            .residues
            .into_iter()
            .enumerate()
            .map(|(i, r)| validate_residue(i + 1, r))
            .collect::<Result<Vec<_>, _>>()?;

        let name = document.name.unwrap_or_else(|| UNNAMED.to_string());
        Ok(Conformation::new(name, residues))
    }

    fn write_to(conformation: &Conformation, writer: &mut impl Write) -> Result<(), Self::Error> {
        let document = ConfDocumentRef {
            name: conformation.name(),
            residues: conformation.residues(),
        };
        let text = toml::to_string(&document)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}
