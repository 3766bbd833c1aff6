//! WebSocket endpoint
//!
//! Mounted at the app root so clients connect to `ws://host/ws`. The hub
//! behind it is the same one the task service publishes through.

use axum::{Router, routing::get};
use realtime::ws_handler;
use std::sync::Arc;

use crate::state::AppState;

/// Create the WebSocket router; merged at the app root
pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(Arc::clone(&state.hub))
}
