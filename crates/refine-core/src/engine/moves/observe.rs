use super::{TrialContext, TrialMove};
use crate::core::models::conformation::Conformation;
use crate::engine::error::EngineError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Destination for snapshots emitted during refinement.
///
/// Observation never feeds back into scoring or acceptance. The conformation's name
/// identifies the snapshot; the run manager renames the working state per run.
pub trait ObserverSink: Send + Sync {
    fn observe(
        &self,
        name: &str,
        state: &Conformation,
        score: Option<f64>,
    ) -> Result<(), EngineError>;
}

/// Emits each snapshot as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ObserverSink for TracingSink {
    fn observe(
        &self,
        name: &str,
        state: &Conformation,
        score: Option<f64>,
    ) -> Result<(), EngineError> {
        let residues = state.len();
        match score {
            Some(score) => info!(target: "refine::observer", name, residues, score, "Snapshot."),
            None => debug!(target: "refine::observer", name, residues, "Snapshot."),
        }
        Ok(())
    }
}

/// Trial operator that hands the current state to an [`ObserverSink`].
#[derive(Clone)]
pub struct ObserveMover {
    sink: Arc<dyn ObserverSink>,
    with_energy: bool,
}

impl ObserveMover {
    pub fn new(sink: Arc<dyn ObserverSink>) -> Self {
        Self {
            sink,
            with_energy: false,
        }
    }

    /// Also score the state and pass the score along.
    pub fn with_energy(mut self, enabled: bool) -> Self {
        self.with_energy = enabled;
        self
    }

    pub fn sink(&self) -> &Arc<dyn ObserverSink> {
        &self.sink
    }
}

impl fmt::Debug for ObserveMover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserveMover")
            .field("with_energy", &self.with_energy)
            .finish_non_exhaustive()
    }
}

impl TrialMove for ObserveMover {
    fn name(&self) -> &'static str {
        "observe"
    }

    fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        let score = if self.with_energy {
            Some(ctx.scorer.score(state)?)
        } else {
            None
        };
        self.sink.observe(state.name(), state, score)
    }
}
