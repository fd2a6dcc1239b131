use uuid::Uuid;

use crate::executor::http::TransportError;
use crate::executor::resolver::ExtractionError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Steps executed, which is also the length of the run's history.
    pub executed: usize,
    /// Placeholders that could not be filled; none of them stopped the run.
    pub extraction_errors: Vec<ExtractionError>,
}

/// Errors that abort a run. History keeps the steps that completed before it.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid step reference at order[{position}]: {reason}")]
    InvalidStepReference { position: usize, reason: String },
    #[error("step not found at order[{position}]: `{step_id}`")]
    StepNotFound { position: usize, step_id: String },
    #[error("request for step `{step_id}` failed: {source}")]
    Transport {
        step_id: String,
        #[source]
        source: TransportError,
    },
}

impl RunError {
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::InvalidStepReference { .. } => "invalid_step_reference",
            RunError::StepNotFound { .. } => "step_not_found",
            RunError::Transport { .. } => "transport",
        }
    }

    pub fn step_id(&self) -> Option<&str> {
        match self {
            RunError::InvalidStepReference { .. } => None,
            RunError::StepNotFound { step_id, .. } | RunError::Transport { step_id, .. } => {
                Some(step_id)
            }
        }
    }
}
