use super::{TrialContext, TrialMove};
use crate::core::models::conformation::Conformation;
use crate::core::models::movemap::MoveMap;
use crate::core::models::residue::Torsion;
use crate::core::scoring::function::Scorer;
use crate::engine::config::{DEFAULT_MIN_MAX_ITERATIONS, DEFAULT_MIN_TOLERANCE};
use crate::engine::error::EngineError;
use tracing::trace;

/// Finite-difference step in degrees.
const GRADIENT_STEP: f64 = 0.01;
/// Largest single-torsion displacement of the first line-search trial, in degrees.
const MAX_STEP: f64 = 5.0;
const ARMIJO_C: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 30;

/// Steepest-descent minimization over the free torsions of a move map.
///
/// Gradients are central finite differences of the trial scorer; every step is an
/// Armijo backtracking line search, so the score never increases.
#[derive(Debug, Clone)]
pub struct MinMover {
    movemap: MoveMap,
    tolerance: f64,
    max_iterations: usize,
}

impl MinMover {
    pub fn new(movemap: MoveMap) -> Self {
        Self {
            movemap,
            tolerance: DEFAULT_MIN_TOLERANCE,
            max_iterations: DEFAULT_MIN_MAX_ITERATIONS,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

fn read_dofs(state: &Conformation, dofs: &[(usize, Torsion)]) -> Result<Vec<f64>, EngineError> {
    dofs.iter()
        .map(|&(i, t)| {
            state.torsion(i, t).ok_or_else(|| {
                EngineError::Internal(format!("residue {i} has no torsion {t}"))
            })
        })
        .collect()
}

fn write_dofs(state: &mut Conformation, dofs: &[(usize, Torsion)], values: &[f64]) {
    for (&(i, t), &v) in dofs.iter().zip(values) {
        state.set_torsion(i, t, v);
    }
}

fn gradient(
    scorer: &dyn Scorer,
    state: &Conformation,
    dofs: &[(usize, Torsion)],
    x: &[f64],
) -> Result<Vec<f64>, EngineError> {
    let mut shifted = state.clone();
    let mut grad = Vec::with_capacity(dofs.len());
    for (k, &(i, t)) in dofs.iter().enumerate() {
        shifted.set_torsion(i, t, x[k] + GRADIENT_STEP);
        let forward = scorer.score(&shifted)?;
        shifted.set_torsion(i, t, x[k] - GRADIENT_STEP);
        let backward = scorer.score(&shifted)?;
        shifted.set_torsion(i, t, x[k]);
        grad.push((forward - backward) / (2.0 * GRADIENT_STEP));
    }
    Ok(grad)
}

fn converged(previous: f64, current: f64, tolerance: f64) -> bool {
    2.0 * (previous - current).abs() <= tolerance * (previous.abs() + current.abs() + 1e-10)
}

impl TrialMove for MinMover {
    fn name(&self) -> &'static str {
        "minimize"
    }

    fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        let dofs = self.movemap.free_torsions(state);
        if dofs.is_empty() {
            return Ok(());
        }

        let mut x = read_dofs(state, &dofs)?;
        let mut f = ctx.scorer.score(state)?;
        let start = f;
        let mut trial = state.clone();
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let g = gradient(ctx.scorer, state, &dofs, &x)?;
            let g_max = g.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if g_max == 0.0 {
                break;
            }
            let g_norm2: f64 = g.iter().map(|v| v * v).sum();

            let mut alpha = MAX_STEP / g_max;
            let mut step = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate: Vec<f64> =
                    x.iter().zip(&g).map(|(xi, gi)| xi - alpha * gi).collect();
                write_dofs(&mut trial, &dofs, &candidate);
                let f_new = ctx.scorer.score(&trial)?;
                if f_new <= f - ARMIJO_C * alpha * g_norm2 {
                    step = Some((candidate, f_new));
                    break;
                }
                alpha *= 0.5;
            }

            let Some((candidate, f_new)) = step else {
                break;
            };
            write_dofs(state, &dofs, &candidate);
            // Re-read so x matches the wrapped values stored in the state.
            x = read_dofs(state, &dofs)?;
            let done = converged(f, f_new, self.tolerance);
            f = f_new;
            if done {
                break;
            }
        }

        trace!(iterations, start, end = f, "Minimization finished.");
        Ok(())
    }
}
