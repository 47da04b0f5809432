use super::config::RefinementConfig;
use super::moves::ObserverSink;
use super::progress::ProgressReporter;
use crate::core::models::conformation::Conformation;
use crate::core::scoring::function::Scorer;

/// Read-only resources shared by every run of a refinement.
#[derive(Clone, Copy)]
pub struct RefinementContext<'a> {
    pub reference: &'a Conformation,
    pub config: &'a RefinementConfig,
    pub scorer: &'a dyn Scorer,
    pub observer: &'a dyn ObserverSink,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> RefinementContext<'a> {
    pub fn new(
        reference: &'a Conformation,
        config: &'a RefinementConfig,
        scorer: &'a dyn Scorer,
        observer: &'a dyn ObserverSink,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            reference,
            config,
            scorer,
            observer,
            reporter,
        }
    }

    /// `<prefix>_<index>`, the name a run's working state carries.
    pub fn run_label(&self, index: usize) -> String {
        format!("{}_{}", self.config.output_prefix, index)
    }
}
