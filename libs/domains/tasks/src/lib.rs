//! Tasks Domain
//!
//! This module provides a complete domain implementation for managing tasks using MongoDB,
//! with realtime event fan-out and an audit trail on every mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (JWT-protected)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────────┐
//! │   Service   │─────▶│ RealtimeHub  │  ← taskCreated / taskUpdated /
//! └──────┬──────┘      └──────────────┘    taskDeleted / notification
//!        │
//!        │             ┌──────────────┐
//!        ├────────────▶│ AuditRecorder│  ← append-only mutation trail
//!        │             └──────────────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, expanded views
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use domain_audit::MongoAuditRecorder;
//! use domain_tasks::{
//!     handlers,
//!     mongodb::MongoTaskRepository,
//!     service::TaskService,
//! };
//! use mongodb::Client;
//! use realtime::RealtimeHub;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a MongoDB client
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! // Create the repository, hub, recorder and service
//! let repository = MongoTaskRepository::new(db.clone());
//! let hub = Arc::new(RealtimeHub::new());
//! let audit = Arc::new(MongoAuditRecorder::new(db));
//! let service = TaskService::new(repository, hub, audit);
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{TaskError, TaskResult};
pub use handlers::ApiDoc;
pub use models::{CreateTask, Task, TaskPriority, TaskQuery, TaskStatus, TaskView, UpdateTask, UserRef};
pub use mongodb::MongoTaskRepository;
pub use repository::TaskRepository;
pub use service::{
    NOTIFICATION_EVENT, TASK_CREATED_EVENT, TASK_DELETED_EVENT, TASK_UPDATED_EVENT, TaskService,
};
