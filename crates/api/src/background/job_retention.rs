//! Periodic eviction of finished jobs.
//!
//! Terminal jobs are otherwise kept for the life of the process. When a
//! retention window is configured, this task removes jobs whose last
//! transition is older than the window, along with their stored artifacts.
//! `processing` jobs are never touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pdfshield_core::registry::JobRegistry;
use pdfshield_core::storage::ArtifactStore;
use tokio_util::sync::CancellationToken;

/// Run the retention loop until `cancel` is triggered.
pub async fn run(
    registry: Arc<JobRegistry>,
    store: Arc<dyn ArtifactStore>,
    retention: chrono::Duration,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        retention_hours = retention.num_hours(),
        interval_secs = interval.as_secs(),
        "Job retention task started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention task stopping");
                break;
            }
            _ = ticker.tick() => {
                let evicted = sweep(&registry, store.as_ref(), retention).await;
                if evicted > 0 {
                    tracing::info!(evicted, "Job retention: evicted finished jobs");
                } else {
                    tracing::debug!("Job retention: nothing to evict");
                }
            }
        }
    }
}

/// Evict terminal jobs older than `retention` once. Returns how many were
/// removed.
pub async fn sweep(
    registry: &JobRegistry,
    store: &dyn ArtifactStore,
    retention: chrono::Duration,
) -> usize {
    let cutoff = Utc::now() - retention;
    let evicted = registry.evict_terminal_before(cutoff);

    for record in &evicted {
        if let Some(location) = &record.result_location {
            if let Err(e) = store.remove(location).await {
                tracing::error!(job_id = %record.id, location = %location, error = %e, "Job retention: artifact removal failed");
            }
        }
    }

    evicted.len()
}
