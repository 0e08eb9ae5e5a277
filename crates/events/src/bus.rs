//! In-process fan-out hub for job state changes.
//!
//! [`EventBus`] hands every subscriber its own bounded queue. Publishing never
//! waits on a subscriber: a queue that is closed or full gets its subscriber
//! evicted from the active set, so a stalled client cannot hold up delivery
//! to the others and every subscriber still registered has seen every event
//! in publish order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use pdfshield_core::job::{JobRecord, JobStatus};
use pdfshield_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};

// ---------------------------------------------------------------------------
// JobEvent
// ---------------------------------------------------------------------------

/// A state change pushed to subscribers.
///
/// Serializes as `{id, status, resultLocation?, errorDetail?, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub message: String,
}

impl JobEvent {
    /// Build the event announcing `record`'s current state.
    pub fn from_record(record: &JobRecord) -> Self {
        let message = match record.status {
            JobStatus::Processing => "File is being processed",
            JobStatus::Completed => "File processed successfully",
            JobStatus::Failed => "File processing failed",
        };
        Self {
            id: record.id.clone(),
            status: record.status,
            result_location: record.result_location.clone(),
            error_detail: record.error_detail.clone(),
            message: message.to_string(),
        }
    }

    /// JSON text for the wire.
    pub fn to_json(&self) -> String {
        // A struct of strings and a unit enum cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Identifier assigned to each subscriber.
pub type SubscriberId = u64;

/// Receiving end of one subscriber's queue.
///
/// `recv` yields `None` once the bus has evicted this subscriber or been
/// closed.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<JobEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<JobEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking receive; `None` if nothing is queued.
    pub fn try_recv(&mut self) -> Option<JobEvent> {
        self.receiver.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default per-subscriber queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

struct Subscriber {
    sender: mpsc::Sender<JobEvent>,
    connected_at: Timestamp,
}

/// Publish/subscribe hub shared via `Arc<EventBus>`.
pub struct EventBus {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

impl EventBus {
    /// Create a bus whose subscribers each buffer up to `queue_capacity`
    /// undelivered events.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new subscriber.
    pub async fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let subscriber = Subscriber {
            sender,
            connected_at: chrono::Utc::now(),
        };
        self.subscribers.write().await.insert(id, subscriber);
        tracing::debug!(subscriber_id = id, "Subscriber registered");
        Subscription { id, receiver }
    }

    /// Remove a subscriber, e.g. after its transport disconnected.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        if let Some(sub) = self.subscribers.write().await.remove(&id) {
            let connected_secs = (chrono::Utc::now() - sub.connected_at).num_seconds();
            tracing::debug!(subscriber_id = id, connected_secs, "Subscriber removed");
        }
    }

    /// Deliver `event` to every active subscriber.
    ///
    /// Returns the number of subscribers the event was queued for. Subscribers
    /// whose queue is closed or full are dropped; nothing is reported back to
    /// the publisher.
    pub async fn publish(&self, event: JobEvent) -> usize {
        let mut delivered = 0;
        let mut evicted = Vec::new();

        {
            let subs = self.subscribers.read().await;
            for (id, sub) in subs.iter() {
                match sub.sender.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(subscriber_id = id, job_id = %event.id, "Subscriber queue full, evicting");
                        evicted.push(*id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        tracing::debug!(subscriber_id = id, "Subscriber channel closed, evicting");
                        evicted.push(*id);
                    }
                }
            }
        }

        if !evicted.is_empty() {
            let mut subs = self.subscribers.write().await;
            for id in evicted {
                subs.remove(&id);
            }
        }

        tracing::debug!(job_id = %event.id, status = %event.status, delivered, "Job event published");
        delivered
    }

    /// Current number of active subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Drop every subscriber. Their subscriptions observe end-of-stream.
    pub async fn close_all(&self) {
        let mut subs = self.subscribers.write().await;
        let count = subs.len();
        subs.clear();
        tracing::info!(count, "Closed all event subscribers");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, status: JobStatus) -> JobEvent {
        JobEvent {
            id: JobId::from(id),
            status,
            result_location: None,
            error_detail: None,
            message: "test".into(),
        }
    }

    #[tokio::test]
    async fn every_subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe().await;
        let mut b = bus.subscribe().await;

        let delivered = bus.publish(event("job-1", JobStatus::Completed)).await;

        assert_eq!(delivered, 2);
        assert_eq!(a.recv().await.unwrap().id, JobId::from("job-1"));
        assert_eq!(b.recv().await.unwrap().id, JobId::from("job-1"));
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe().await;

        for i in 0..10 {
            bus.publish(event(&format!("job-{i}"), JobStatus::Failed)).await;
        }

        for i in 0..10 {
            assert_eq!(sub.recv().await.unwrap().id, JobId::from(format!("job-{i}")));
        }
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_delivers_nothing() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(event("orphan", JobStatus::Failed)).await, 0);
    }

    #[tokio::test]
    async fn dropped_subscription_is_evicted_without_affecting_others() {
        let bus = EventBus::default();
        let gone = bus.subscribe().await;
        let mut alive = bus.subscribe().await;
        drop(gone);

        let delivered = bus.publish(event("job-1", JobStatus::Completed)).await;

        assert_eq!(delivered, 1);
        assert_eq!(bus.subscriber_count().await, 1);
        assert!(alive.recv().await.is_some());
    }

    #[tokio::test]
    async fn full_queue_evicts_stalled_subscriber() {
        let bus = EventBus::new(2);
        let mut stalled = bus.subscribe().await;
        let mut live = bus.subscribe().await;

        for i in 0..3 {
            bus.publish(event(&format!("job-{i}"), JobStatus::Completed)).await;
            live.recv().await.unwrap();
        }

        assert_eq!(bus.subscriber_count().await, 1);

        // The stalled subscriber keeps what was queued, then sees end-of-stream.
        assert!(stalled.recv().await.is_some());
        assert!(stalled.recv().await.is_some());
        assert!(stalled.recv().await.is_none());
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe().await;
        bus.unsubscribe(sub.id()).await;

        assert_eq!(bus.publish(event("job-1", JobStatus::Failed)).await, 0);
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn close_all_ends_every_subscription() {
        let bus = EventBus::default();
        let mut a = bus.subscribe().await;
        let mut b = bus.subscribe().await;

        bus.close_all().await;

        assert_eq!(bus.subscriber_count().await, 0);
        assert!(a.recv().await.is_none());
        assert!(b.recv().await.is_none());
    }

    #[test]
    fn event_json_shape() {
        let json: serde_json::Value = serde_json::from_str(
            &JobEvent {
                id: JobId::from("A"),
                status: JobStatus::Failed,
                result_location: None,
                error_detail: Some("scan timeout".into()),
                message: "File processing failed".into(),
            }
            .to_json(),
        )
        .unwrap();

        assert_eq!(json["id"], "A");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["errorDetail"], "scan timeout");
        assert_eq!(json["message"], "File processing failed");
        assert!(json.get("resultLocation").is_none());
    }
}
