use super::error::EngineError;
use super::metropolis::{Decision, MetropolisGate};
use super::moves::TrialContext;
use super::progress::{Progress, ProgressReporter};
use super::trial::TrialMover;
use crate::core::models::conformation::Conformation;

/// Applies a gated trial a fixed number of times.
///
/// Every cycle runs regardless of whether earlier trials were accepted; there is no
/// convergence check. Cycles that lower the best score report it as a status update.
#[derive(Debug, Clone)]
pub struct RepeatMover {
    trial: TrialMover,
    cycles: usize,
}

impl RepeatMover {
    pub fn new(trial: TrialMover, cycles: usize) -> Self {
        Self { trial, cycles }
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn trial(&self) -> &TrialMover {
        &self.trial
    }

    pub fn apply(
        &self,
        state: &mut Conformation,
        gate: &mut MetropolisGate,
        ctx: &mut TrialContext<'_>,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        reporter.report(Progress::TaskStart {
            total_steps: self.cycles as u64,
        });
        for _ in 0..self.cycles {
            if self.trial.apply(state, gate, ctx)? == Decision::Improved {
                reporter.report(Progress::StatusUpdate {
                    text: format!("best {:.4}", gate.best_score()),
                });
            }
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        Ok(())
    }
}
