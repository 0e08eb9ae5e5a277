pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{callback, download, status, upload};
use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// ```text
/// POST /upload                  multipart PDF upload
/// POST /callback/success?id=    sanitizer success callback (body = PDF)
/// POST /callback/failure?id=    sanitizer failure callback (body = text)
/// GET  /status?id=              job status
/// GET  /download?file=          sanitized artifact
/// GET  /ws                      WebSocket job events
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/callback/success", post(callback::success_callback))
        .route("/callback/failure", post(callback::failure_callback))
        .route("/status", get(status::job_status))
        .route("/download", get(download::download))
        .route("/ws", get(ws::ws_handler))
}
