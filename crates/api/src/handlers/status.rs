use axum::extract::{Query, State};
use axum::Json;
use pdfshield_core::error::CoreError;

use crate::engine::query::{self, StatusReport};
use crate::error::AppResult;
use crate::query::JobIdParams;
use crate::state::AppState;

/// GET /api/status?id=
pub async fn job_status(
    State(state): State<AppState>,
    Query(params): Query<JobIdParams>,
) -> AppResult<Json<StatusReport>> {
    let id = params.job_id().ok_or(CoreError::MissingId)?;
    Ok(Json(query::job_status(&state.registry, id)))
}
