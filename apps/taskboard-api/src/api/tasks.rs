//! Tasks API routes
//!
//! Wires the tasks domain to HTTP routes: MongoDB repository, the shared
//! realtime hub, and the audit recorder all feed the task service.

use axum::{Router, middleware};
use axum_helpers::auth::jwt_auth_middleware;
use domain_audit::MongoAuditRecorder;
use domain_tasks::{MongoTaskRepository, TaskService, handlers};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Create the tasks router, JWT-protected
pub fn router(state: &AppState) -> Router {
    // Create the MongoDB repository
    let repository = MongoTaskRepository::new(state.db.clone());

    // Audit recorder appending to the audit_logs collection
    let audit = Arc::new(MongoAuditRecorder::new(state.db.clone()));

    // Create the service; mutations fan out through the shared hub
    let service = TaskService::new(repository, Arc::clone(&state.hub), audit);

    // The domain's router behind JWT authentication
    handlers::router(service).layer(middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        jwt_auth_middleware,
    ))
}

/// Initialize task and audit indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    let repository = MongoTaskRepository::new(db.clone());
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create task indexes: {}", e))?;
    info!("Task collection indexes created");

    let recorder = MongoAuditRecorder::new(db.clone());
    recorder
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create audit indexes: {}", e))?;
    info!("Audit collection indexes created");

    Ok(())
}
