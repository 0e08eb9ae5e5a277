//! Sanitizer callback endpoints.
//!
//! Both endpoints acknowledge with `200` whenever the request carried an id,
//! including callbacks that were ignored as unknown or duplicate. Retrying
//! those would not change anything, so the sanitizer is not asked to.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use pdfshield_core::types::JobId;
use serde::Serialize;

use crate::engine::IngestOutcome;
use crate::error::AppResult;
use crate::query::JobIdParams;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub success: bool,
    pub message: String,
    pub id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl CallbackAck {
    fn from_outcome(outcome: IngestOutcome, accepted_message: &str) -> Self {
        match outcome {
            IngestOutcome::Accepted(record) => Self {
                success: true,
                message: accepted_message.to_string(),
                id: record.id,
                filename: record.result_location,
            },
            IngestOutcome::Ignored { id, reason } => Self {
                success: true,
                message: format!("Callback ignored: {reason}"),
                id,
                filename: None,
            },
        }
    }
}

/// POST /api/callback/success?id=
///
/// The request body is the sanitized document.
pub async fn success_callback(
    State(state): State<AppState>,
    Query(params): Query<JobIdParams>,
    body: Bytes,
) -> AppResult<Json<CallbackAck>> {
    let outcome = state
        .ingestion
        .ingest_success(params.job_id(), &body)
        .await?;
    Ok(Json(CallbackAck::from_outcome(
        outcome,
        "File processed successfully",
    )))
}

/// POST /api/callback/failure?id=
///
/// The request body is the sanitizer's diagnostic text.
pub async fn failure_callback(
    State(state): State<AppState>,
    Query(params): Query<JobIdParams>,
    body: Bytes,
) -> AppResult<Json<CallbackAck>> {
    let detail = String::from_utf8_lossy(&body).into_owned();
    let outcome = state
        .ingestion
        .ingest_failure(params.job_id(), detail)
        .await?;
    Ok(Json(CallbackAck::from_outcome(
        outcome,
        "Failure callback received",
    )))
}
