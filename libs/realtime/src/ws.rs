//! WebSocket connection handling.
//!
//! Each upgraded connection gets a fresh connection id and a writer task.
//! The reader loop understands one client frame, `joinUserRoom`, which
//! subscribes the connection to the room named by the user id it carries.
//! Everything else the server pushes one way; clients never acknowledge.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::hub::RealtimeHub;
use crate::models::{Envelope, JOIN_USER_ROOM};

/// axum handler that upgrades an HTTP request to a WebSocket connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<Arc<RealtimeHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handles an upgraded WebSocket connection.
///
/// The connection lifecycle:
/// 1. Assign a connection id and register with the hub.
/// 2. Spawn a writer task that forwards hub messages to the socket.
/// 3. Read client frames, handling `joinUserRoom` subscriptions.
/// 4. On disconnect, unregister (which also clears room memberships).
pub async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>) {
    let conn_id = Uuid::new_v4();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Channel for messages the hub wants to push to this connection.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    hub.register(conn_id, tx).await;
    tracing::info!(connection_id = %conn_id, "client connected");

    // Writer task: forwards messages from the hub channel to the WebSocket.
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!(connection_id = %conn_id, "WebSocket write failed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    // Reader loop: process incoming frames from this client.
    let reader_hub = Arc::clone(&hub);
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_frame(conn_id, &text, &reader_hub).await;
                }
                Message::Close(_) => {
                    tracing::info!(connection_id = %conn_id, "received close frame");
                    break;
                }
                _ => {
                    // Ignore binary, ping, pong frames.
                }
            }
        }
    });

    // Wait for either task to finish, then abort the other.
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
        }
        _ = &mut write_task => {
            read_task.abort();
        }
    }

    hub.unregister(conn_id).await;
    tracing::info!(connection_id = %conn_id, "client disconnected and unregistered");
}

/// Handles a text frame from a connected client.
async fn handle_client_frame(conn_id: Uuid, text: &str, hub: &Arc<RealtimeHub>) {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(connection_id = %conn_id, error = %e, "failed to decode client frame");
            return;
        }
    };

    match envelope.event.as_str() {
        JOIN_USER_ROOM => {
            let Some(room) = envelope.data.as_str() else {
                tracing::warn!(
                    connection_id = %conn_id,
                    "joinUserRoom frame without a string user id"
                );
                return;
            };
            if room.is_empty() {
                tracing::warn!(connection_id = %conn_id, "joinUserRoom frame with empty user id");
                return;
            }
            if hub.join_room(conn_id, room).await {
                tracing::info!(connection_id = %conn_id, room = %room, "client joined room");
            }
        }
        other => {
            tracing::debug!(
                connection_id = %conn_id,
                event = %other,
                "ignoring unknown client event"
            );
        }
    }
}
