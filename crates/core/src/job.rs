//! Job record and lifecycle state machine.
//!
//! A job starts in [`JobStatus::Processing`] and moves exactly once into one
//! of the terminal states. The outcome of that move is a [`JobOutcome`], which
//! carries either a result location or an error detail, never both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// Diagnostic recorded when the sanitizer handoff itself fails.
pub const DISPATCH_FAILED_DETAIL: &str = "dispatch failed";

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `true` for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The terminal result applied by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { result_location: String },
    Failed { error_detail: String },
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Completed { .. } => JobStatus::Completed,
            Self::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// Authoritative state of one submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    pub original_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JobRecord {
    /// A fresh record in the `processing` state.
    pub fn new(id: JobId, original_name: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            status: JobStatus::Processing,
            original_name: original_name.into(),
            result_location: None,
            error_detail: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply `outcome` in place. The caller is responsible for checking that
    /// the record is still `processing`.
    pub(crate) fn apply(&mut self, outcome: JobOutcome) {
        self.status = outcome.status();
        match outcome {
            JobOutcome::Completed { result_location } => {
                self.result_location = Some(result_location);
            }
            JobOutcome::Failed { error_detail } => {
                self.error_detail = Some(error_detail);
            }
        }
        self.updated_at = chrono::Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_processing() {
        let record = JobRecord::new(JobId::from("a"), "doc.pdf");
        assert_eq!(record.status, JobStatus::Processing);
        assert!(!record.status.is_terminal());
        assert!(record.result_location.is_none());
        assert!(record.error_detail.is_none());
    }

    #[test]
    fn apply_failed_sets_only_error_detail() {
        let mut record = JobRecord::new(JobId::from("a"), "doc.pdf");
        record.apply(JobOutcome::Failed {
            error_detail: "scan timeout".into(),
        });
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error_detail.as_deref(), Some("scan timeout"));
        assert!(record.result_location.is_none());
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn record_serializes_camel_case_and_skips_empty_fields() {
        let record = JobRecord::new(JobId::from("a"), "doc.pdf");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["originalName"], "doc.pdf");
        assert!(json.get("resultLocation").is_none());
        assert!(json.get("errorDetail").is_none());
        assert!(json["updatedAt"].is_string());
    }
}
