use super::potentials::{
    eclipse_energy, omega_energy, rama_energy, soft_repulsion, staggered_energy,
};
use super::term::{ScoreTerms, ScoreWeights};
use crate::core::geometry::ca_trace;
use crate::core::models::conformation::Conformation;
use thiserror::Error;

/// CA atoms closer than this (Å) are penalized.
pub const DEFAULT_CLASH_CUTOFF: f64 = 4.0;
/// Residues closer than this in sequence never clash with each other.
pub const MIN_CLASH_SEPARATION: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Score of '{name}' is not finite ({value})")]
    NonFinite { name: String, value: f64 },
}

/// Evaluates a conformation. Lower is better.
///
/// Implementations must be deterministic for a given conformation and safe to share
/// between concurrently running trajectories.
pub trait Scorer: Sync {
    fn score(&self, conformation: &Conformation) -> Result<f64, ScoringError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreFunction {
    weights: ScoreWeights,
    clash_cutoff: f64,
}

impl Default for ScoreFunction {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl ScoreFunction {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            clash_cutoff: DEFAULT_CLASH_CUTOFF,
        }
    }

    pub fn with_clash_cutoff(mut self, cutoff: f64) -> Self {
        self.clash_cutoff = cutoff;
        self
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Computes every unweighted term.
    pub fn terms(&self, conformation: &Conformation) -> ScoreTerms {
        let residues = conformation.residues();
        let mut terms = ScoreTerms::default();

        for residue in residues {
            terms.rama += rama_energy(residue.phi, residue.psi);
            terms.omega += omega_energy(residue.omega);
            terms.rotamer += residue.chi.iter().map(|&c| staggered_energy(c)).sum::<f64>();
        }

        for pair in residues.windows(2) {
            if let (Some(&a), Some(&b)) = (pair[0].chi.first(), pair[1].chi.first()) {
                terms.chi_pair += eclipse_energy(a, b);
            }
        }

        if self.weights.clash != 0.0 && residues.len() > MIN_CLASH_SEPARATION {
            let trace = ca_trace(conformation);
            for i in 0..trace.len() {
                for j in (i + MIN_CLASH_SEPARATION)..trace.len() {
                    let dist = (trace[i] - trace[j]).norm();
                    terms.clash += soft_repulsion(dist, self.clash_cutoff);
                }
            }
        }

        terms
    }
}

impl Scorer for ScoreFunction {
    fn score(&self, conformation: &Conformation) -> Result<f64, ScoringError> {
        let total = self.terms(conformation).weighted_total(&self.weights);
        if !total.is_finite() {
            return Err(ScoringError::NonFinite {
                name: conformation.name().to_string(),
                value: total,
            });
        }
        Ok(total)
    }
}
