#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use pdfshield_api::config::ServerConfig;
use pdfshield_api::router::build_app_router;
use pdfshield_api::state::AppState;
use pdfshield_core::storage::LocalArtifactStore;
use pdfshield_core::types::JobId;
use pdfshield_sanitizer::{CallbackUrls, Sanitizer, SanitizerError};

/// Multipart boundary used by [`multipart_upload`].
pub const BOUNDARY: &str = "pdfshield-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Artifacts go to `upload_dir`; the sanitizer URL is never contacted
/// because tests inject a [`FakeSanitizer`].
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        public_base_url: "http://127.0.0.1:3000".to_string(),
        sanitizer_url: "http://127.0.0.1:9/sanitise/pdf".to_string(),
        sanitizer_timeout_secs: 5,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        subscriber_queue_capacity: 64,
        job_retention_hours: None,
        job_retention_interval_secs: 3600,
    }
}

/// In-process stand-in for the sanitization service.
#[derive(Default)]
pub struct FakeSanitizer {
    reject: bool,
    delay: Option<Duration>,
    submitted: Mutex<Vec<(JobId, Vec<u8>, CallbackUrls)>>,
}

impl FakeSanitizer {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            reject: true,
            ..Self::default()
        })
    }

    /// Rejects every job, but only after `delay`.
    pub fn slow_rejecting(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reject: true,
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn submitted(&self) -> Vec<(JobId, Vec<u8>, CallbackUrls)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sanitizer for FakeSanitizer {
    async fn submit(
        &self,
        id: &JobId,
        document: Vec<u8>,
        callbacks: &CallbackUrls,
    ) -> Result<(), SanitizerError> {
        self.submitted
            .lock()
            .unwrap()
            .push((id.clone(), document, callbacks.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject {
            return Err(SanitizerError::ApiError {
                status: 503,
                body: "sanitizer offline".into(),
            });
        }
        Ok(())
    }
}

/// A fully wired application plus handles for inspecting it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub sanitizer: Arc<FakeSanitizer>,
    _upload_dir: TempDir,
}

/// Build the full application router with all middleware layers around a
/// fresh registry, a temporary artifact directory and `sanitizer`.
///
/// Uses [`build_app_router`] so tests exercise the same middleware stack
/// as production.
pub fn build_test_app(sanitizer: Arc<FakeSanitizer>) -> TestApp {
    build_test_app_with(sanitizer, |_| {})
}

/// Like [`build_test_app`], with `configure` applied to the test config.
pub fn build_test_app_with(
    sanitizer: Arc<FakeSanitizer>,
    configure: impl FnOnce(&mut ServerConfig),
) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(upload_dir.path());
    configure(&mut config);
    let store = Arc::new(LocalArtifactStore::new(upload_dir.path()));

    let state = AppState::new(config.clone(), sanitizer.clone(), store);
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        sanitizer,
        _upload_dir: upload_dir,
    }
}

/// Send a GET request.
pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Send a POST request with a raw byte body.
pub async fn post_bytes(app: &TestApp, uri: &str, body: impl Into<Vec<u8>>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .body(Body::from(body.into()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Send a multipart upload with a single `field` part.
pub async fn post_multipart(
    app: &TestApp,
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_upload(
            field,
            file_name,
            content_type,
            data,
        )))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Encode one file part as a `multipart/form-data` body.
pub fn multipart_upload(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Upload `data` as a PDF and return the new job id.
pub async fn upload_pdf(app: &TestApp, data: &[u8]) -> String {
    let response = post_multipart(app, "file", "report.pdf", "application/pdf", data).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
