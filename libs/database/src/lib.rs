//! MongoDB connectivity for the taskboard services
//!
//! Provides connection management, startup retry, and health checks for the
//! document store every domain crate persists into.
//!
//! # Features
//!
//! - `config` - Loading [`MongoConfig`] from the environment via
//!   `core_config::FromEnv`
//!
//! # Examples
//!
//! ```ignore
//! use database::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "taskboard");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod config;
pub mod connector;
pub mod health;
pub mod retry;

pub use config::MongoConfig;
pub use connector::{
    MongoError, connect, connect_from_config, connect_from_config_with_retry, connect_with_retry,
};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use retry::{RetryConfig, retry, retry_with_backoff};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
