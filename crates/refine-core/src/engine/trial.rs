use super::config::RejectionPolicy;
use super::error::EngineError;
use super::metropolis::{Decision, MetropolisGate};
use super::moves::TrialContext;
use super::sequence::TrialSequence;
use crate::core::models::conformation::Conformation;
use tracing::trace;

/// One gated trial: perturb with the sequence, score, then let the gate decide.
#[derive(Debug, Clone)]
pub struct TrialMover {
    sequence: TrialSequence,
    policy: RejectionPolicy,
}

impl TrialMover {
    pub fn new(sequence: TrialSequence, policy: RejectionPolicy) -> Self {
        Self { sequence, policy }
    }

    pub fn sequence(&self) -> &TrialSequence {
        &self.sequence
    }

    pub fn policy(&self) -> RejectionPolicy {
        self.policy
    }

    pub fn apply(
        &self,
        state: &mut Conformation,
        gate: &mut MetropolisGate,
        ctx: &mut TrialContext<'_>,
    ) -> Result<Decision, EngineError> {
        self.sequence.apply(state, ctx)?;
        let score = ctx.scorer.score(state)?;
        let decision = gate.evaluate(state, score, &mut *ctx.rng);
        trace!(score, ?decision, "Trial evaluated.");

        if decision == Decision::Rejected && self.policy == RejectionPolicy::Revert {
            state.clone_from(gate.last_accepted());
        }
        Ok(decision)
    }
}
