//! Sanitizer callback ingestion.
//!
//! The sanitizer reports each job's outcome by calling back with the job id.
//! Callbacks may be duplicated, arrive late, or name ids this process never
//! issued; all of those are acknowledged but leave the registry untouched and
//! publish nothing. Exactly one event is published per accepted transition.

use std::sync::Arc;

use pdfshield_core::error::CoreError;
use pdfshield_core::job::{JobOutcome, JobRecord};
use pdfshield_core::registry::JobRegistry;
use pdfshield_core::storage::ArtifactStore;
use pdfshield_core::types::JobId;
use pdfshield_events::{EventBus, JobEvent};

/// Result of a well-formed callback.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The transition was applied and announced.
    Accepted(JobRecord),
    /// The callback was acknowledged but had no effect.
    Ignored { id: JobId, reason: CoreError },
}

pub struct CallbackIngestion {
    registry: Arc<JobRegistry>,
    event_bus: Arc<EventBus>,
    store: Arc<dyn ArtifactStore>,
}

impl CallbackIngestion {
    pub fn new(
        registry: Arc<JobRegistry>,
        event_bus: Arc<EventBus>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            registry,
            event_bus,
            store,
        }
    }

    /// Handle a success callback carrying the sanitized document.
    ///
    /// The document is only stored while the job is still `processing`. If
    /// the transition loses a race after storing, the artifact is removed
    /// again.
    pub async fn ingest_success(
        &self,
        id: Option<JobId>,
        document: &[u8],
    ) -> Result<IngestOutcome, CoreError> {
        let id = id.ok_or(CoreError::MissingId)?;

        match self.registry.get(&id) {
            Ok(record) if record.status.is_terminal() => {
                let reason = CoreError::InvalidTransition {
                    id: id.clone(),
                    from: record.status,
                };
                return Ok(ignored(id, reason));
            }
            Ok(_) => {}
            Err(e @ CoreError::NotFound { .. }) => return Ok(ignored(id, e)),
            Err(e) => return Err(e),
        }

        let location = self.store.put(&id, document).await?;
        let outcome = JobOutcome::Completed {
            result_location: location.clone(),
        };

        match self.registry.transition(&id, outcome) {
            Ok(record) => Ok(self.accept(record).await),
            Err(e @ (CoreError::NotFound { .. } | CoreError::InvalidTransition { .. })) => {
                if let Err(rm) = self.store.remove(&location).await {
                    tracing::warn!(job_id = %id, location = %location, error = %rm, "Failed to remove orphaned artifact");
                }
                Ok(ignored(id, e))
            }
            Err(e) => Err(e),
        }
    }

    /// Handle a failure callback carrying the sanitizer's diagnostic.
    pub async fn ingest_failure(
        &self,
        id: Option<JobId>,
        detail: String,
    ) -> Result<IngestOutcome, CoreError> {
        let id = id.ok_or(CoreError::MissingId)?;
        tracing::info!(job_id = %id, detail = %detail, "Sanitizer reported failure");

        let outcome = JobOutcome::Failed {
            error_detail: detail,
        };
        match self.registry.transition(&id, outcome) {
            Ok(record) => Ok(self.accept(record).await),
            Err(e @ (CoreError::NotFound { .. } | CoreError::InvalidTransition { .. })) => {
                Ok(ignored(id, e))
            }
            Err(e) => Err(e),
        }
    }

    async fn accept(&self, record: JobRecord) -> IngestOutcome {
        tracing::info!(job_id = %record.id, status = %record.status, "Job transition accepted");
        self.event_bus.publish(JobEvent::from_record(&record)).await;
        IngestOutcome::Accepted(record)
    }
}

fn ignored(id: JobId, reason: CoreError) -> IngestOutcome {
    tracing::warn!(job_id = %id, reason = %reason, "Callback ignored");
    IngestOutcome::Ignored { id, reason }
}
