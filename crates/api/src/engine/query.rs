//! Read-only job status and artifact lookups.

use pdfshield_core::error::CoreError;
use pdfshield_core::job::{JobRecord, JobStatus};
use pdfshield_core::registry::JobRegistry;
use pdfshield_core::storage::{Artifact, ArtifactStore};
use pdfshield_core::types::{JobId, Timestamp};
use serde::Serialize;

/// Message reported for jobs this process has no record of.
pub const UNKNOWN_JOB_MESSAGE: &str = "File is being processed";

/// Status payload returned to polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<JobRecord> for StatusReport {
    fn from(record: JobRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            original_name: Some(record.original_name),
            result_location: record.result_location,
            error_detail: record.error_detail,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
            message: None,
        }
    }
}

impl StatusReport {
    /// Placeholder for an id the registry has not seen.
    fn unknown(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            original_name: None,
            result_location: None,
            error_detail: None,
            created_at: None,
            updated_at: None,
            message: Some(UNKNOWN_JOB_MESSAGE.to_string()),
        }
    }
}

/// Current status of `id`.
///
/// Unknown ids report `processing` rather than an error: the caller may be
/// polling for a job whose record it simply has not observed yet.
pub fn job_status(registry: &JobRegistry, id: JobId) -> StatusReport {
    match registry.get(&id) {
        Ok(record) => record.into(),
        Err(_) => StatusReport::unknown(id),
    }
}

/// The sanitized artifact at `location`, opened for streaming.
pub async fn download_result(
    store: &dyn ArtifactStore,
    location: &str,
) -> Result<Artifact, CoreError> {
    store.open(location).await
}
