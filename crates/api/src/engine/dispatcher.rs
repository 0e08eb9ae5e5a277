//! Job submission.
//!
//! [`SubmissionDispatcher`] registers a `processing` job and forwards the
//! document to the sanitizer. Only the handoff is awaited; the outcome
//! arrives later through the callback endpoints. A handoff that fails is
//! recorded as the job's own `failed` transition so clients see it through
//! the same status and event paths as a sanitizer-reported failure.
//!
//! The handoff runs on its own task. Dropping the caller's future (request
//! timeout, client disconnect) does not cancel it, so a created job always
//! leaves `processing` through either the sanitizer or a dispatch failure.

use std::sync::Arc;

use pdfshield_core::error::CoreError;
use pdfshield_core::job::{JobOutcome, JobRecord, DISPATCH_FAILED_DETAIL};
use pdfshield_core::registry::JobRegistry;
use pdfshield_core::types::JobId;
use pdfshield_events::{EventBus, JobEvent};
use pdfshield_sanitizer::{CallbackUrls, Sanitizer};

#[derive(Clone)]
pub struct SubmissionDispatcher {
    registry: Arc<JobRegistry>,
    event_bus: Arc<EventBus>,
    sanitizer: Arc<dyn Sanitizer>,
    callbacks: CallbackUrls,
}

impl SubmissionDispatcher {
    pub fn new(
        registry: Arc<JobRegistry>,
        event_bus: Arc<EventBus>,
        sanitizer: Arc<dyn Sanitizer>,
        callbacks: CallbackUrls,
    ) -> Self {
        Self {
            registry,
            event_bus,
            sanitizer,
            callbacks,
        }
    }

    /// Submit `document` for sanitization.
    ///
    /// Returns the job snapshot after the handoff: `processing` when the
    /// sanitizer accepted it, `failed` with [`DISPATCH_FAILED_DETAIL`] when it
    /// could not be reached or rejected the job. Errors are registry
    /// invariant violations or a handoff task that panicked.
    pub async fn submit(
        &self,
        document: Vec<u8>,
        original_name: &str,
    ) -> Result<JobRecord, CoreError> {
        let id = JobId::generate();
        let size = document.len();
        let record = self.registry.create(id.clone(), original_name)?;
        tracing::info!(job_id = %id, original_name, size, "Job created");

        let handoff = tokio::spawn(self.clone().hand_off(record, document));
        handoff
            .await
            .map_err(|e| CoreError::Internal(format!("handoff task for job {id} aborted: {e}")))?
    }

    async fn hand_off(self, record: JobRecord, document: Vec<u8>) -> Result<JobRecord, CoreError> {
        let id = record.id.clone();
        match self.sanitizer.submit(&id, document, &self.callbacks).await {
            Ok(()) => {
                tracing::info!(job_id = %id, "Document handed to sanitizer");
                Ok(record)
            }
            Err(e) => {
                self.record_dispatch_failure(&id, CoreError::DispatchFailure(e.to_string()))
                    .await
            }
        }
    }

    /// Turn a failed handoff into the job's own `failed` transition.
    async fn record_dispatch_failure(
        &self,
        id: &JobId,
        reason: CoreError,
    ) -> Result<JobRecord, CoreError> {
        tracing::warn!(job_id = %id, error = %reason, "Sanitizer handoff failed");
        let outcome = JobOutcome::Failed {
            error_detail: DISPATCH_FAILED_DETAIL.to_string(),
        };
        match self.registry.transition(id, outcome) {
            Ok(record) => {
                self.event_bus.publish(JobEvent::from_record(&record)).await;
                Ok(record)
            }
            // A callback beat the failed handoff to the registry; its outcome stands.
            Err(CoreError::InvalidTransition { .. }) => self.registry.get(id),
            Err(e) => Err(e),
        }
    }
}
