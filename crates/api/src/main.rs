use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfshield_api::background;
use pdfshield_api::config::ServerConfig;
use pdfshield_api::router::build_app_router;
use pdfshield_api::state::AppState;
use pdfshield_core::storage::{ArtifactStore, LocalArtifactStore};
use pdfshield_sanitizer::{Sanitizer, SanitizerApi};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfshield_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Artifact storage ---
    let store: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::new(&config.upload_dir));
    tracing::info!(upload_dir = %config.upload_dir.display(), "Artifact store ready");

    // --- Sanitizer client ---
    let sanitizer_api = SanitizerApi::new(
        config.sanitizer_url.clone(),
        Duration::from_secs(config.sanitizer_timeout_secs),
    )
    .expect("Failed to build sanitizer HTTP client");
    tracing::info!(
        endpoint = %sanitizer_api.endpoint(),
        timeout_secs = config.sanitizer_timeout_secs,
        "Sanitizer client configured"
    );
    let sanitizer: Arc<dyn Sanitizer> = Arc::new(sanitizer_api);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);

    let state = AppState::new(config.clone(), sanitizer, store);
    let registry = Arc::clone(&state.registry);
    let event_bus = Arc::clone(&state.event_bus);

    // --- Job retention (opt-in) ---
    let retention_cancel = CancellationToken::new();
    let retention_handle = config.job_retention().map(|retention| {
        let interval = Duration::from_secs(config.job_retention_interval_secs);
        tokio::spawn(background::job_retention::run(
            Arc::clone(&registry),
            Arc::clone(&state.store),
            retention,
            interval,
            retention_cancel.clone(),
        ))
    });

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    if let Some(handle) = retention_handle {
        let _ = tokio::time::timeout(shutdown_timeout, handle).await;
        tracing::info!("Job retention task stopped");
    }

    let subscribers = event_bus.subscriber_count().await;
    tracing::info!(subscribers, "Closing remaining event subscribers");
    event_bus.close_all().await;

    tracing::info!(jobs = registry.len(), "Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
