use crate::job::JobStatus;
use crate::types::JobId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing id parameter")]
    MissingId,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid transition for job {id}: already {from}")]
    InvalidTransition { id: JobId, from: JobStatus },

    #[error("Duplicate job id: {0}")]
    DuplicateId(JobId),

    #[error("Dispatch failed: {0}")]
    DispatchFailure(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for an unknown job id.
    pub fn job_not_found(id: &JobId) -> Self {
        Self::NotFound {
            entity: "Job",
            id: id.to_string(),
        }
    }
}
