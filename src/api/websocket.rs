//! WebSocket push channel for live alert delivery.
//!
//! Connection lifecycle:
//! 1. Client opens `GET /ws/alerts`
//! 2. Server sends Welcome with the current counts
//! 3. Every `MonitorEvent` is forwarded as JSON as it is published
//! 4. Heartbeat every 30s until the client closes

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::monitor::{AlertCounts, MonitorEngine};

/// Heartbeat interval: server sends Heartbeat every 30 seconds.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Outgoing frames buffered per connection.
const OUTGOING_BUFFER: usize = 64;

/// Connection-level frames. Monitor events are sent as their own JSON.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutgoing {
    Welcome {
        session_id: String,
        counts: AlertCounts,
    },
    Heartbeat {
        server_time: String,
    },
    /// The connection fell behind and `missed` events were dropped.
    Lagged {
        missed: u64,
    },
}

pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(ctx): State<ApiContext>,
) -> impl IntoResponse {
    let core = ctx.core.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, core))
}

async fn handle_ws(socket: WebSocket, core: Arc<CoreState>) {
    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(session_id = %session_id, "WebSocket connected");

    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTGOING_BUFFER);

    // Sender task (reads from channel, writes to WebSocket)
    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        while let Some(json) = rx.recv().await {
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Subscribe before Welcome so nothing published in between is lost.
    let mut events = core.engine().subscribe();

    let counts = core.engine().counts().unwrap_or_default();
    let welcome = WsOutgoing::Welcome {
        session_id: session_id.clone(),
        counts,
    };
    let mut open = send_json(&tx, &welcome).await;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // Consume initial immediate tick

    while open {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {} // Client frames carry no commands
                }
            }
            event = events.recv() => {
                open = match event {
                    Ok(event) => send_json(&tx, &event).await,
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(session_id = %session_id, missed, "WebSocket client lagging");
                        send_json(&tx, &WsOutgoing::Lagged { missed }).await
                    }
                    Err(RecvError::Closed) => false,
                };
            }
            _ = heartbeat.tick() => {
                let frame = WsOutgoing::Heartbeat {
                    server_time: chrono::Utc::now().to_rfc3339(),
                };
                open = send_json(&tx, &frame).await;
            }
        }
    }

    // Cleanup: drop sender (stops sender task)
    drop(tx);
    let _ = sender_handle.await;

    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

/// Queue one frame. Returns `false` once the sender task is gone.
async fn send_json<T: Serialize>(tx: &mpsc::Sender<String>, frame: &T) -> bool {
    match serde_json::to_string(frame) {
        Ok(json) => tx.send(json).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WebSocket frame");
            true
        }
    }
}
