use super::residue::{Residue, Torsion};

/// A full candidate solution: an ordered chain of residues in torsion space.
///
/// Cloning produces an independent deep copy. The refinement engine depends on this to
/// reset each trajectory from the reference structure without aliasing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conformation {
    name: String,
    residues: Vec<Residue>,
}

impl Conformation {
    pub fn new(name: impl Into<String>, residues: Vec<Residue>) -> Self {
        Self {
            name: name.into(),
            residues,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the structure. Observers and output writers identify structures by this name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    pub fn residue_mut(&mut self, index: usize) -> Option<&mut Residue> {
        self.residues.get_mut(index)
    }

    pub fn torsion(&self, index: usize, torsion: Torsion) -> Option<f64> {
        self.residues.get(index).and_then(|r| r.torsion(torsion))
    }

    /// Sets a torsion on residue `index`. Returns `false` if the residue or chi does not exist.
    pub fn set_torsion(&mut self, index: usize, torsion: Torsion, value: f64) -> bool {
        self.residues
            .get_mut(index)
            .is_some_and(|r| r.set_torsion(torsion, value))
    }

    /// One-letter sequence, with `X` for unrecognized residue names.
    pub fn sequence(&self) -> String {
        self.residues.iter().map(Residue::one_letter_code).collect()
    }

    pub fn total_chi_count(&self) -> usize {
        self.residues.iter().map(Residue::chi_count).sum()
    }
}
