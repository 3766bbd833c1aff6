//! Realtime Events
//!
//! In-memory WebSocket hub for pushing task events to connected clients.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  ws_handler │  ← WebSocket upgrade + per-connection tasks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ RealtimeHub │  ← Connection registry, rooms, broadcast/emit
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Envelope   │  ← {"event": ..., "data": ...} wire frames
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use realtime::{RealtimeHub, ws_handler};
//! use serde_json::json;
//!
//! # async fn example() {
//! let hub = Arc::new(RealtimeHub::new());
//!
//! // Mount the WebSocket endpoint
//! let router: axum::Router = axum::Router::new()
//!     .route("/ws", axum::routing::get(ws_handler))
//!     .with_state(Arc::clone(&hub));
//!
//! // Services publish through the same hub
//! hub.broadcast("taskCreated", json!({"title": "Ship it"})).await;
//! hub.emit_to_room("user-1", "notification", json!({"type": "assignment"})).await;
//! # }
//! ```

pub mod hub;
pub mod models;
pub mod ws;

// Re-export commonly used types
pub use hub::RealtimeHub;
pub use models::{Envelope, JOIN_USER_ROOM};
pub use ws::{handle_socket, ws_handler};
