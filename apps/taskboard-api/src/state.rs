//! Application state management.
//!
//! This module defines the shared application state passed to all request handlers.
//! The state contains:
//! - Configuration
//! - MongoDB client
//! - The realtime hub
//! - JWT authentication

use axum_helpers::JwtAuth;
use mongodb::{Client, Database};
use realtime::RealtimeHub;
use std::sync::Arc;

/// Shared application state.
///
/// This struct is cloned for each handler (inexpensive Arc clones), providing access to:
/// - Application configuration
/// - MongoDB client and database
/// - The process-wide realtime hub
/// - JWT signing and verification
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
    /// Realtime hub shared by the task service and the /ws endpoint
    pub hub: Arc<RealtimeHub>,
    /// JWT authentication (stateless HS256)
    pub jwt_auth: JwtAuth,
}
