use std::fmt;

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque job correlation key.
///
/// Freshly generated ids are UUID v4 strings, but ids arriving on callbacks
/// are caller-supplied text and are kept verbatim so lookups of foreign ids
/// simply miss instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a new random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turn an optional, possibly blank query parameter into a [`JobId`].
///
/// Returns `None` for absent or whitespace-only values.
pub fn parse_job_id(raw: Option<&str>) -> Option<JobId> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(JobId::from)
}
