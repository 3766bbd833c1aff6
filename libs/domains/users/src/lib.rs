//! Users Domain
//!
//! This module provides a complete domain implementation for user accounts and
//! authentication using MongoDB.
//!
//! # Features
//!
//! - Registration and login with Argon2 password hashing
//! - JWT session issuance (Authorization header or HttpOnly cookie)
//! - Profile read/update
//! - User directory listing for task assignment
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (auth public, rest JWT-protected)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, password hashing, validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{
//!     auth_handlers::{self, AuthState},
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository);
//! let jwt_auth = JwtAuth::new(&JwtConfig::new("a-signing-secret-at-least-32-chars!!"));
//!
//! let state = AuthState { service, jwt_auth };
//! let router = auth_handlers::auth_router(state);
//! ```

pub mod auth_handlers;
pub mod error;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth_handlers::{AuthState, auth_router, profile_router, users_router};
pub use error::{UserError, UserResult};
pub use models::{LoginUser, RegisterUser, UpdateProfile, User, UserView};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
