//! Audit Domain
//!
//! Append-only audit trail for entity mutations, stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  ← domain services append entries
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Recorder   │  ← AuditRecorder trait (append-only)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   MongoDB   │  ← audit_logs collection
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_audit::{AuditAction, AuditRecorder, MongoAuditRecorder};
//! use mongodb::Client;
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! let recorder = MongoAuditRecorder::new(db);
//! recorder
//!     .append(
//!         AuditAction::Create,
//!         "Task",
//!         Uuid::now_v7(),
//!         Uuid::now_v7(),
//!         "Created task: Write report".to_string(),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod mongodb;
pub mod recorder;

// Re-export commonly used types
pub use error::{AuditError, AuditResult};
pub use models::{AuditAction, AuditLog};
pub use mongodb::MongoAuditRecorder;
pub use recorder::AuditRecorder;
