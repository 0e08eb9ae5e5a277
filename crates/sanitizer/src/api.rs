//! HTTP client for the external PDF sanitization service.
//!
//! The service accepts the raw document on a single `POST` endpoint and
//! reports the outcome later by calling one of the two callback URLs it was
//! given. This client only performs that initial handoff.

use std::time::Duration;

use async_trait::async_trait;
use pdfshield_core::types::JobId;
use reqwest::header::CONTENT_TYPE;

/// Where the sanitizer should report back for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    pub success: String,
    pub failure: String,
}

/// Errors from the sanitizer handoff.
#[derive(Debug, thiserror::Error)]
pub enum SanitizerError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The sanitizer returned a non-2xx status code.
    #[error("Sanitizer API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Something that can accept a document for asynchronous sanitization.
#[async_trait]
pub trait Sanitizer: Send + Sync {
    /// Hand `document` over for job `id`. Returns once the service has
    /// accepted (or rejected) the job, not when sanitization finishes.
    async fn submit(
        &self,
        id: &JobId,
        document: Vec<u8>,
        callbacks: &CallbackUrls,
    ) -> Result<(), SanitizerError>;
}

/// [`Sanitizer`] backed by the service's HTTP endpoint.
pub struct SanitizerApi {
    client: reqwest::Client,
    endpoint: String,
}

impl SanitizerApi {
    /// Create a client for `endpoint`, e.g. `http://localhost:8000/sanitise/pdf`.
    ///
    /// Every handoff is bounded by `timeout`.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, SanitizerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ensure the response has a success status code, capturing the body
    /// for diagnostics otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<(), SanitizerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SanitizerError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Sanitizer for SanitizerApi {
    async fn submit(
        &self,
        id: &JobId,
        document: Vec<u8>,
        callbacks: &CallbackUrls,
    ) -> Result<(), SanitizerError> {
        tracing::debug!(job_id = %id, endpoint = %self.endpoint, size = document.len(), "Submitting document to sanitizer");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("id", id.as_str()),
                ("success_callback_url", callbacks.success.as_str()),
                ("failure_callback_url", callbacks.failure.as_str()),
            ])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(document)
            .send()
            .await?;

        Self::ensure_success(response).await
    }
}
