use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use crate::engine::query;
use crate::error::{AppError, AppResult};
use crate::handlers::upload::PDF_CONTENT_TYPE;
use crate::query::FileParams;
use crate::state::AppState;

/// GET /api/download?file=
///
/// Streams a sanitized artifact as an attachment. References that do not
/// resolve to a stored artifact are `404`.
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> AppResult<Response> {
    let file = params
        .file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing file parameter".into()))?;

    let artifact = query::download_result(state.store.as_ref(), &file).await?;
    tracing::debug!(file = %file, size = artifact.size, "Streaming artifact");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, artifact.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file}\""),
        )
        .body(Body::from_stream(ReaderStream::new(artifact.reader)))
        .map_err(|e| AppError::InternalError(e.to_string()))
}
