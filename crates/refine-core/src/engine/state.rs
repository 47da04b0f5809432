use super::metropolis::GateCounters;
use crate::core::models::conformation::Conformation;

/// Outcome of one run, or of the reference structure at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub index: usize,
    pub label: String,
    pub score: f64,
    /// CA RMSD to the reference after superposition; `None` when it cannot be computed.
    pub rmsd: Option<f64>,
    pub state: Conformation,
    /// Gate statistics of the run; absent for the reference record.
    pub counters: Option<GateCounters>,
}

impl RunRecord {
    pub fn reference(state: Conformation, score: f64) -> Self {
        Self {
            index: 0,
            label: state.name().to_string(),
            score,
            rmsd: Some(0.0),
            state,
            counters: None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.index == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementResult {
    /// Reference record first, then one record per run in run order.
    pub records: Vec<RunRecord>,
}

impl RefinementResult {
    pub fn reference(&self) -> Option<&RunRecord> {
        self.records.first()
    }

    pub fn runs(&self) -> &[RunRecord] {
        self.records.get(1..).unwrap_or(&[])
    }

    /// Reference score followed by the best score of every run.
    pub fn scores(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.score).collect()
    }

    /// The lowest-scoring run, ignoring the reference.
    pub fn best(&self) -> Option<&RunRecord> {
        self.runs()
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }
}
