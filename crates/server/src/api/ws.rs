//! WebSocket support for real-time occupancy updates.
//!
//! Each client receives the current room snapshot on connect, then every
//! snapshot the engine broadcasts after a committed mutation, plus a
//! periodic heartbeat.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use seating_core::TableSnapshot;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between keep-alive heartbeats.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// The full room view after a committed mutation (and on connect).
    TableUpdate { tables: Vec<TableSnapshot> },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before sending the initial snapshot so a mutation landing
    // in between is not missed.
    let mut rx = state.allocator().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let initial = match state.allocator().current_snapshot() {
        Ok(snapshot) => WsMessage::TableUpdate {
            tables: snapshot.tables,
        },
        Err(e) => {
            error!("Failed to compute initial snapshot: {}", e);
            WS_CONNECTIONS_ACTIVE.dec();
            return;
        }
    };

    let send_task = tokio::spawn(async move {
        if send_message(&mut sender, &initial).await.is_err() {
            return;
        }

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(snapshot) => {
                            let msg = WsMessage::TableUpdate {
                                tables: snapshot.tables,
                            };
                            if send_message(&mut sender, &msg).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket client lagged, skipped {} snapshots", n);
                            WS_LAG_EVENTS.inc();
                            // Keep receiving; the next snapshot is always complete
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Snapshot channel closed");
                            break;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    let msg = WsMessage::Heartbeat {
                        timestamp: chrono::Utc::now().timestamp(),
                    };
                    if send_message(&mut sender, &msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Ping(data)) => {
                // Pong is handled automatically by axum
                debug!("Received ping: {:?}", data);
            }
            Ok(Message::Text(text)) => {
                // Clients are not expected to send anything, but log it
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

async fn send_message(
    sender: &mut (impl SinkExt<Message> + Unpin),
    msg: &WsMessage,
) -> Result<(), ()> {
    let msg_type = match msg {
        WsMessage::TableUpdate { .. } => "table_update",
        WsMessage::Heartbeat { .. } => "heartbeat",
    };
    WS_MESSAGES_SENT.with_label_values(&[msg_type]).inc();

    match serde_json::to_string(msg) {
        Ok(json) => sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| ()),
        Err(e) => {
            error!("Failed to serialize WsMessage: {}", e);
            Ok(())
        }
    }
}
