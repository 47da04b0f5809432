use crate::core::geometry::wrap_degrees;
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of packable side-chain chi angles per canonical residue.
///
/// Proline is listed with zero because ring closure couples its chis to the backbone.
static CHI_COUNTS: Map<&'static str, usize> = phf_map! {
    "ALA" => 0, "ARG" => 4, "ASN" => 2, "ASP" => 2, "CYS" => 1,
    "GLN" => 3, "GLU" => 3, "GLY" => 0, "HIS" => 2, "ILE" => 2,
    "LEU" => 2, "LYS" => 4, "MET" => 3, "PHE" => 2, "PRO" => 0,
    "SER" => 1, "THR" => 1, "TRP" => 2, "TYR" => 2, "VAL" => 1,
};

static ONE_LETTER_CODES: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
};

pub const TRANS_OMEGA: f64 = 180.0;

/// Identifies a single dihedral degree of freedom on a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Torsion {
    Phi,
    Psi,
    Omega,
    Chi(usize),
}

impl fmt::Display for Torsion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Torsion::Phi => write!(f, "phi"),
            Torsion::Psi => write!(f, "psi"),
            Torsion::Omega => write!(f, "omega"),
            Torsion::Chi(i) => write!(f, "chi{}", i + 1),
        }
    }
}

fn default_omega() -> f64 {
    TRANS_OMEGA
}

/// A residue described by its dihedral angles, all in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residue {
    pub name: String,
    pub phi: f64,
    pub psi: f64,
    #[serde(default = "default_omega")]
    pub omega: f64,
    #[serde(default)]
    pub chi: Vec<f64>,
}

impl Residue {
    /// Creates a residue with a trans peptide bond and every chi at 180 degrees.
    pub fn new(name: &str, phi: f64, psi: f64) -> Self {
        let name = name.to_ascii_uppercase();
        let n_chi = expected_chi_count(&name).unwrap_or(0);
        Self {
            name,
            phi: wrap_degrees(phi),
            psi: wrap_degrees(psi),
            omega: TRANS_OMEGA,
            chi: vec![180.0; n_chi],
        }
    }

    pub fn with_chi(mut self, chi: Vec<f64>) -> Self {
        self.chi = chi.into_iter().map(wrap_degrees).collect();
        self
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = wrap_degrees(omega);
        self
    }

    #[inline]
    pub fn chi_count(&self) -> usize {
        self.chi.len()
    }

    pub fn one_letter_code(&self) -> char {
        ONE_LETTER_CODES
            .get(self.name.as_str())
            .copied()
            .unwrap_or('X')
    }

    pub fn torsion(&self, torsion: Torsion) -> Option<f64> {
        match torsion {
            Torsion::Phi => Some(self.phi),
            Torsion::Psi => Some(self.psi),
            Torsion::Omega => Some(self.omega),
            Torsion::Chi(i) => self.chi.get(i).copied(),
        }
    }

    /// Sets a torsion, wrapping the value into (-180, 180].
    ///
    /// Returns `false` when the residue has no such chi angle.
    pub fn set_torsion(&mut self, torsion: Torsion, value: f64) -> bool {
        let value = wrap_degrees(value);
        match torsion {
            Torsion::Phi => self.phi = value,
            Torsion::Psi => self.psi = value,
            Torsion::Omega => self.omega = value,
            Torsion::Chi(i) => match self.chi.get_mut(i) {
                Some(slot) => *slot = value,
                None => return false,
            },
        }
        true
    }
}

/// Number of packable chi angles for a three-letter residue name, or `None` if unknown.
pub fn expected_chi_count(name: &str) -> Option<usize> {
    CHI_COUNTS.get(name).copied()
}

pub fn is_known_residue(name: &str) -> bool {
    CHI_COUNTS.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_residue_uses_trans_omega_and_fills_chis_for_its_type() {
        let residue = Residue::new("lys", -60.0, -40.0);
        assert_eq!(residue.name, "LYS");
        assert_eq!(residue.omega, TRANS_OMEGA);
        assert_eq!(residue.chi, vec![180.0; 4]);
    }

    #[test]
    fn new_residue_without_chis_has_empty_chi_list() {
        let residue = Residue::new("GLY", 80.0, 10.0);
        assert_eq!(residue.chi_count(), 0);
    }

    #[test]
    fn set_torsion_wraps_values_into_range() {
        let mut residue = Residue::new("ALA", 0.0, 0.0);
        assert!(residue.set_torsion(Torsion::Phi, 190.0));
        assert!((residue.phi - (-170.0)).abs() < 1e-9);
        assert!(residue.set_torsion(Torsion::Psi, -540.0));
        assert!((residue.psi - 180.0).abs() < 1e-9);
    }

    #[test]
    fn set_torsion_rejects_missing_chi() {
        let mut residue = Residue::new("SER", -60.0, -40.0);
        assert!(residue.set_torsion(Torsion::Chi(0), 65.0));
        assert!(!residue.set_torsion(Torsion::Chi(1), 65.0));
        assert_eq!(residue.torsion(Torsion::Chi(0)), Some(65.0));
        assert_eq!(residue.torsion(Torsion::Chi(1)), None);
    }

    #[test]
    fn chi_count_table_covers_canonical_residues() {
        assert_eq!(expected_chi_count("ARG"), Some(4));
        assert_eq!(expected_chi_count("VAL"), Some(1));
        assert_eq!(expected_chi_count("XYZ"), None);
        assert!(is_known_residue("TRP"));
    }

    #[test]
    fn one_letter_code_falls_back_to_x_for_unknown_names() {
        let mut residue = Residue::new("TYR", 0.0, 0.0);
        assert_eq!(residue.one_letter_code(), 'Y');
        residue.name = "UNK".to_string();
        assert_eq!(residue.one_letter_code(), 'X');
    }

    #[test]
    fn torsion_display_uses_one_based_chi_numbering() {
        assert_eq!(Torsion::Chi(0).to_string(), "chi1");
        assert_eq!(Torsion::Omega.to_string(), "omega");
    }
}
