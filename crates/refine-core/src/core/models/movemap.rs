use super::conformation::Conformation;
use super::residue::Torsion;
use std::collections::HashMap;

/// Per-residue switches controlling which torsions may move.
///
/// Defaults apply to every residue unless overridden for a specific index. A fresh map
/// has everything fixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveMap {
    bb_default: bool,
    chi_default: bool,
    bb_overrides: HashMap<usize, bool>,
    chi_overrides: HashMap<usize, bool>,
}

impl MoveMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// All backbone torsions free, side chains fixed.
    pub fn backbone() -> Self {
        Self {
            bb_default: true,
            ..Self::default()
        }
    }

    pub fn set_bb(&mut self, free: bool) {
        self.bb_default = free;
        self.bb_overrides.clear();
    }

    pub fn set_bb_at(&mut self, index: usize, free: bool) {
        self.bb_overrides.insert(index, free);
    }

    pub fn set_chi(&mut self, free: bool) {
        self.chi_default = free;
        self.chi_overrides.clear();
    }

    pub fn set_chi_at(&mut self, index: usize, free: bool) {
        self.chi_overrides.insert(index, free);
    }

    pub fn is_bb_free(&self, index: usize) -> bool {
        self.bb_overrides
            .get(&index)
            .copied()
            .unwrap_or(self.bb_default)
    }

    pub fn is_chi_free(&self, index: usize) -> bool {
        self.chi_overrides
            .get(&index)
            .copied()
            .unwrap_or(self.chi_default)
    }

    /// Indices of residues whose backbone may move, in chain order.
    pub fn free_backbone_residues(&self, conformation: &Conformation) -> Vec<usize> {
        (0..conformation.len())
            .filter(|&i| self.is_bb_free(i))
            .collect()
    }

    /// Every free continuous degree of freedom, in chain order: phi, psi, then chis.
    ///
    /// Omega is never included; peptide bonds stay at their input geometry.
    pub fn free_torsions(&self, conformation: &Conformation) -> Vec<(usize, Torsion)> {
        let mut dofs = Vec::new();
        for (i, residue) in conformation.residues().iter().enumerate() {
            if self.is_bb_free(i) {
                dofs.push((i, Torsion::Phi));
                dofs.push((i, Torsion::Psi));
            }
            if self.is_chi_free(i) {
                dofs.extend((0..residue.chi_count()).map(|k| (i, Torsion::Chi(k))));
            }
        }
        dofs
    }
}
