use super::{TrialContext, TrialMove};
use crate::core::models::conformation::Conformation;
use crate::core::models::movemap::MoveMap;
use crate::engine::config::DEFAULT_PACK_MAX_PASSES;
use crate::engine::error::EngineError;
use itertools::Itertools;
use tracing::trace;

/// Staggered chi values tried for every packable angle.
pub const ROTAMER_WELLS: [f64; 3] = [-60.0, 60.0, 180.0];

/// Every combination of [`ROTAMER_WELLS`] for `n` chi angles, first chi varying slowest.
fn rotamer_candidates(n: usize) -> Vec<Vec<f64>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    (0..n)
        .map(|_| ROTAMER_WELLS.iter().copied())
        .multi_cartesian_product()
        .collect()
}

/// Discrete side-chain optimization by repeated singlet sweeps.
///
/// Each sweep visits the packable residues in chain order and gives each one the
/// lowest-scoring rotamer with every other residue held fixed. The current chi values
/// are always kept in the candidate set, so the score never increases. Sweeps stop when
/// nothing changes or after `max_passes`.
#[derive(Debug, Clone)]
pub struct PackMover {
    movemap: MoveMap,
    max_passes: usize,
}

impl Default for PackMover {
    fn default() -> Self {
        let mut movemap = MoveMap::new();
        movemap.set_chi(true);
        Self::new(movemap)
    }
}

impl PackMover {
    pub fn new(movemap: MoveMap) -> Self {
        Self {
            movemap,
            max_passes: DEFAULT_PACK_MAX_PASSES,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }
}

impl TrialMove for PackMover {
    fn name(&self) -> &'static str {
        "pack"
    }

    fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        let packable: Vec<usize> = state
            .residues()
            .iter()
            .enumerate()
            .filter(|(i, r)| r.chi_count() > 0 && self.movemap.is_chi_free(*i))
            .map(|(i, _)| i)
            .collect();
        if packable.is_empty() {
            return Ok(());
        }

        let mut best_score = ctx.scorer.score(state)?;
        let mut passes = 0;
        while passes < self.max_passes {
            passes += 1;
            let mut changed = false;

            for &i in &packable {
                let Some(residue) = state.residue(i) else {
                    continue;
                };
                let current = residue.chi.clone();
                let mut best_chi = current.clone();

                for candidate in rotamer_candidates(current.len()) {
                    if candidate == current {
                        continue;
                    }
                    if let Some(residue) = state.residue_mut(i) {
                        residue.chi.clone_from(&candidate);
                    }
                    let score = ctx.scorer.score(state)?;
                    if score < best_score {
                        best_score = score;
                        best_chi = candidate;
                    }
                }

                if let Some(residue) = state.residue_mut(i) {
                    residue.chi = best_chi;
                    changed |= residue.chi != current;
                }
            }

            if !changed {
                break;
            }
        }

        trace!(passes, score = best_score, "Packing finished.");
        Ok(())
    }
}
