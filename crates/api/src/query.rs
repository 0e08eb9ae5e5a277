//! Shared query parameter types for API handlers.

use pdfshield_core::types::{parse_job_id, JobId};
use serde::Deserialize;

/// `?id=` correlation key used by callbacks and status polling.
///
/// Kept optional at the extractor level so a missing id surfaces as
/// `MissingId` instead of a generic query rejection.
#[derive(Debug, Deserialize)]
pub struct JobIdParams {
    pub id: Option<String>,
}

impl JobIdParams {
    /// The trimmed, non-empty id, if any.
    pub fn job_id(&self) -> Option<JobId> {
        parse_job_id(self.id.as_deref())
    }
}

/// `?file=` artifact reference used by downloads.
#[derive(Debug, Deserialize)]
pub struct FileParams {
    pub file: Option<String>,
}
