//! Document upload.

use axum::extract::{Multipart, State};
use axum::Json;
use pdfshield_core::error::CoreError;
use pdfshield_core::job::JobStatus;
use pdfshield_core::types::JobId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The only accepted upload content type.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Name used when the client sends a file part without a file name.
const FALLBACK_FILE_NAME: &str = "document.pdf";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub id: JobId,
    pub original_name: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// POST /api/upload
///
/// Accepts a multipart form with a required `file` field holding a PDF.
/// The job id is returned even when the sanitizer handoff fails; that
/// failure is reported as the job's own `failed` status.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(CoreError::Validation("Only PDF files are allowed".into()).into());
        }
        let name = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some((name, data.to_vec()));
    }

    let (original_name, data) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".into()))?;

    let record = state.dispatcher.submit(data, &original_name).await?;

    Ok(Json(UploadResponse {
        success: true,
        id: record.id,
        original_name: record.original_name,
        status: record.status,
        error_detail: record.error_detail,
    }))
}
