//! Connection and room registry for realtime event delivery.
//!
//! The hub tracks every live WebSocket connection and the rooms each
//! connection has joined. Services hold an `Arc<RealtimeHub>` and publish
//! events through it without knowing anything about sockets.
//!
//! Delivery is fire-and-forget: a send failure means the receiver's writer
//! task is gone, which its connection handler cleans up on its own. Emitting
//! never blocks a caller on slow or dead clients.

use std::collections::{HashMap, HashSet};

use axum::extract::ws::Message;
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::models::Envelope;

/// Registry state: live connections and room memberships.
///
/// Both tables sit behind one lock so a connection removal and its room
/// sweep are observed atomically.
struct HubInner {
    /// Maps connection id to the sender half of its outbound message channel.
    connections: HashMap<Uuid, mpsc::UnboundedSender<Message>>,
    /// Maps room name to the set of member connection ids.
    rooms: HashMap<String, HashSet<Uuid>>,
}

/// In-memory hub for broadcasting and room-targeted event delivery.
///
/// Thread-safe via [`RwLock`]. One instance is shared across the HTTP
/// handlers, the WebSocket handlers, and the domain services.
pub struct RealtimeHub {
    inner: RwLock<HubInner>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    /// Creates a new, empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HubInner {
                connections: HashMap::new(),
                rooms: HashMap::new(),
            }),
        }
    }

    /// Registers a connection, storing the sender half of its message channel.
    ///
    /// If the connection id was already registered, the old sender is
    /// replaced and returned (the previous writer task will detect the
    /// channel closure and shut down).
    pub async fn register(
        &self,
        conn_id: Uuid,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Option<mpsc::UnboundedSender<Message>> {
        let mut inner = self.inner.write().await;
        inner.connections.insert(conn_id, sender)
    }

    /// Removes a connection and every room membership it held.
    ///
    /// Rooms left empty by the removal are dropped from the registry.
    /// Returns the sender if the connection existed.
    pub async fn unregister(&self, conn_id: Uuid) -> Option<mpsc::UnboundedSender<Message>> {
        let mut inner = self.inner.write().await;
        let sender = inner.connections.remove(&conn_id);
        inner.rooms.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
        sender
    }

    /// Adds a connection to a room.
    ///
    /// Joining is idempotent, and a connection may belong to any number of
    /// rooms. Returns `false` if the connection is not registered.
    pub async fn join_room(&self, conn_id: Uuid, room: &str) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.connections.contains_key(&conn_id) {
            return false;
        }
        inner.rooms.entry(room.to_string()).or_default().insert(conn_id);
        true
    }

    /// Sends an event to every connected client.
    ///
    /// Send failures are logged and skipped; the failing connection's own
    /// handler is responsible for unregistering it.
    pub async fn broadcast(&self, event: &str, data: Value) {
        let message = match Envelope::new(event, data).to_message() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(event = %event, error = %e, "failed to encode broadcast event");
                return;
            }
        };

        let inner = self.inner.read().await;
        tracing::debug!(
            event = %event,
            connections = inner.connections.len(),
            "broadcasting event"
        );
        for (conn_id, sender) in inner.connections.iter() {
            if sender.send(message.clone()).is_err() {
                tracing::warn!(
                    connection_id = %conn_id,
                    event = %event,
                    "broadcast send failed, receiver gone"
                );
            }
        }
    }

    /// Sends an event to every member of a room.
    ///
    /// A missing or empty room is a silent no-op.
    pub async fn emit_to_room(&self, room: &str, event: &str, data: Value) {
        let message = match Envelope::new(event, data).to_message() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(event = %event, error = %e, "failed to encode room event");
                return;
            }
        };

        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room) else {
            tracing::debug!(room = %room, event = %event, "no members in room, skipping emit");
            return;
        };

        tracing::debug!(
            room = %room,
            event = %event,
            members = members.len(),
            "emitting event to room"
        );
        for conn_id in members {
            if let Some(sender) = inner.connections.get(conn_id)
                && sender.send(message.clone()).is_err()
            {
                tracing::warn!(
                    connection_id = %conn_id,
                    room = %room,
                    event = %event,
                    "room send failed, receiver gone"
                );
            }
        }
    }

    /// Send a WebSocket Close frame to all connected clients.
    ///
    /// Each connection's writer task forwards the close frame, which lets
    /// clients detect the shutdown. Used during graceful shutdown.
    pub async fn close_all_connections(&self) {
        let inner = self.inner.read().await;
        for (conn_id, sender) in inner.connections.iter() {
            tracing::info!(connection_id = %conn_id, "sending close frame to client");
            let _ = sender.send(Message::Close(None));
        }
    }

    /// Returns the number of live connections.
    pub async fn connection_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.connections.len()
    }

    /// Returns the number of members in a room (0 if the room is absent).
    pub async fn room_size(&self, room: &str) -> usize {
        let inner = self.inner.read().await;
        inner.rooms.get(room).map_or(0, HashSet::len)
    }
}
