//! API routes module
//!
//! This module wires the domain crates to HTTP routes. Routes returned by
//! [`routes`] are nested under `/api` by `axum_helpers::create_router`; the
//! readiness and WebSocket routers are merged at the app root.

pub mod auth;
pub mod health;
pub mod tasks;
pub mod ws;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state))
        .nest("/tasks", tasks::router(state))
}
