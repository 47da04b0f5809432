use thiserror::Error;

use crate::core::scoring::function::ScoringError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Energy scoring failed: {source}")]
    Scoring {
        #[from]
        source: ScoringError,
    },

    #[error("Failed to write decoy '{label}': {message}")]
    Output { label: String, message: String },

    #[error("Operator '{operator}' failed: {reason}")]
    Operator {
        operator: &'static str,
        reason: String,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
