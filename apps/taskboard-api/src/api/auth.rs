//! Auth and users API routes
//!
//! Register/login/logout are public; profile and the user directory sit
//! behind the JWT middleware.

use axum::{Router, middleware};
use axum_helpers::auth::jwt_auth_middleware;
use domain_users::{
    MongoUserRepository, UserService,
    auth_handlers::{AuthState, auth_router, profile_router, users_router},
};
use tracing::info;

use crate::state::AppState;

/// Create the auth router (public register/login/logout plus protected
/// profile and user-directory routes)
pub fn router(state: &AppState) -> Router {
    // Use the MongoDB repository with the shared database handle
    let repository = MongoUserRepository::new(state.db.clone());
    let service = UserService::new(repository);

    // Create auth state with JWT authentication
    let auth_state = AuthState {
        service,
        jwt_auth: state.jwt_auth.clone(),
    };

    let protected = Router::new()
        .nest("/profile", profile_router(auth_state.clone()))
        .nest("/users", users_router(auth_state.clone()))
        .layer(middleware::from_fn_with_state(
            state.jwt_auth.clone(),
            jwt_auth_middleware,
        ));

    auth_router(auth_state).merge(protected)
}

/// Initialize user indexes in MongoDB (unique email)
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    let repository = MongoUserRepository::new(db.clone());
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create user indexes: {}", e))?;
    info!("User collection indexes created");
    Ok(())
}
