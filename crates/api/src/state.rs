use std::sync::Arc;

use pdfshield_core::registry::JobRegistry;
use pdfshield_core::storage::ArtifactStore;
use pdfshield_events::EventBus;
use pdfshield_sanitizer::Sanitizer;

use crate::config::ServerConfig;
use crate::engine::{CallbackIngestion, SubmissionDispatcher};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Source of truth for job state.
    pub registry: Arc<JobRegistry>,
    /// Fan-out hub for job state changes (WebSocket subscribers).
    pub event_bus: Arc<EventBus>,
    /// Where sanitized artifacts live.
    pub store: Arc<dyn ArtifactStore>,
    /// Creates jobs and hands documents to the sanitizer.
    pub dispatcher: Arc<SubmissionDispatcher>,
    /// Applies sanitizer callbacks to the registry.
    pub ingestion: Arc<CallbackIngestion>,
}

impl AppState {
    /// Wire up every component around a fresh registry and event bus.
    pub fn new(
        config: ServerConfig,
        sanitizer: Arc<dyn Sanitizer>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let event_bus = Arc::new(EventBus::new(config.subscriber_queue_capacity));

        let dispatcher = Arc::new(SubmissionDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&event_bus),
            sanitizer,
            config.callback_urls(),
        ));
        let ingestion = Arc::new(CallbackIngestion::new(
            Arc::clone(&registry),
            Arc::clone(&event_bus),
            Arc::clone(&store),
        ));

        Self {
            config: Arc::new(config),
            registry,
            event_bus,
            store,
            dispatcher,
            ingestion,
        }
    }
}
