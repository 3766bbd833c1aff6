//! Wire format for realtime events.
//!
//! Every frame on the wire is a JSON text message with an `event` name and a
//! `data` payload. Clients send the same shape back to the server, e.g. to
//! join their notification room after connecting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name a client sends to subscribe to its per-user room.
///
/// The `data` field carries the user id, which becomes the room name verbatim.
pub const JOIN_USER_ROOM: &str = "joinUserRoom";

/// A single realtime frame: event name plus JSON payload.
///
/// # JSON Example
///
/// ```json
/// {
///   "event": "taskCreated",
///   "data": { "_id": "0199…", "title": "Ship release" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name (e.g. "taskCreated", "notification")
    pub event: String,
    /// Event payload
    pub data: Value,
}

impl Envelope {
    /// Create an envelope for the given event and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Serialize into a WebSocket text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be serialized to JSON.
    pub fn to_message(&self) -> Result<axum::extract::ws::Message, serde_json::Error> {
        let text = serde_json::to_string(self)?;
        Ok(axum::extract::ws::Message::Text(text.into()))
    }
}
