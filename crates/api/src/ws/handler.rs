use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use pdfshield_events::EventBus;

use crate::state::AppState;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// First frame sent on every new connection.
pub const GREETING: &str = r#"{"type":"connected"}"#;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is subscribed to the event bus and
/// managed by two tasks (sender + receiver).
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.event_bus))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the event bus.
///   2. Spawns a sender task that forwards events as JSON text frames and
///      sends periodic Ping frames.
///   3. Processes inbound frames on the current task until the client goes
///      away.
///   4. Unsubscribes on disconnect.
async fn handle_socket(socket: WebSocket, event_bus: Arc<EventBus>) {
    let mut subscription = event_bus.subscribe().await;
    let subscriber_id = subscription.id();
    tracing::info!(subscriber_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward queued events to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        if sink.send(Message::Text(GREETING.into())).await.is_err() {
            return;
        }

        let mut heartbeat = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        heartbeat.tick().await;

        loop {
            tokio::select! {
                event = subscription.recv() => {
                    let Some(event) = event else {
                        // Evicted or shutting down.
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    };
                    if sink.send(Message::Text(event.to_json().into())).await.is_err() {
                        tracing::debug!(subscriber_id, "WebSocket sink closed");
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        tracing::debug!(subscriber_id, "WebSocket ping failed");
                        break;
                    }
                }
            }
        }
    });

    // Receiver loop: inbound frames only matter for liveness.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(subscriber_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(subscriber_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    event_bus.unsubscribe(subscriber_id).await;
    send_task.abort();
    tracing::info!(subscriber_id, "WebSocket disconnected");
}
