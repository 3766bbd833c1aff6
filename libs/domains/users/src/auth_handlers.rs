use axum::{
    Extension, Json, Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use axum::extract::State;
use axum_helpers::{
    ACCESS_TOKEN_TTL, JwtAuth, JwtClaims, ValidatedJson,
    audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent},
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{LoginUser, RegisterUser, UpdateProfile, UserView};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Application state for auth handlers
#[derive(Clone)]
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt_auth: JwtAuth,
}

/// Check if running in development mode
fn is_development() -> bool {
    std::env::var("APP_ENV")
        .map(|env| env == "development")
        .unwrap_or_else(|_| cfg!(debug_assertions))
}

fn create_session_token<R: UserRepository>(
    state: &AuthState<R>,
    user: &UserView,
) -> Result<String, UserError> {
    state
        .jwt_auth
        .create_access_token(&user.id.to_string(), &user.email, &user.name)
        .map_err(|e| {
            tracing::error!("Failed to create access token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })
}

fn session_cookie_header(token: &str) -> Result<HeaderValue, UserError> {
    let secure_flag = if is_development() { "" } else { " Secure;" };
    let cookie = format!(
        "access_token={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
        token, secure_flag, ACCESS_TOKEN_TTL
    );

    HeaderValue::from_str(&cookie)
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))
}

fn clear_cookie_header() -> Result<HeaderValue, UserError> {
    let secure_flag = if is_development() { "" } else { " Secure;" };
    let cookie = format!(
        "access_token=; HttpOnly;{} SameSite=Strict; Path=/; Max-Age=0",
        secure_flag
    );

    HeaderValue::from_str(&cookie)
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))
}

fn parse_subject(claims: &JwtClaims) -> Result<Uuid, UserError> {
    claims.sub.parse().map_err(|_| UserError::Unauthorized)
}

/// Register a new user
async fn register<R: UserRepository>(
    State(state): State<AuthState<R>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> Result<Response, UserError> {
    let user = state.service.register(input).await?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "user.register",
        None,
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    let token = create_session_token(&state, &user)?;
    let cookie = session_cookie_header(&token)?;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(user),
    )
        .into_response())
}

/// Login with email/password
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginUser>,
) -> Result<Response, UserError> {
    let user = match state.service.verify_credentials(&input).await {
        Ok(user) => user,
        Err(err) => {
            if matches!(err, UserError::InvalidCredentials) {
                AuditEvent::new(None, "user.login", None, AuditOutcome::Denied)
                    .with_ip(extract_ip_from_headers(&headers))
                    .with_user_agent(extract_user_agent(&headers))
                    .with_details(json!({ "email": input.email }))
                    .log();
            }
            return Err(err);
        }
    };

    AuditEvent::new(
        Some(user.id.to_string()),
        "user.login",
        None,
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    let token = create_session_token(&state, &user)?;
    let cookie = session_cookie_header(&token)?;

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(user)).into_response())
}

/// Logout by clearing the session cookie
///
/// Tokens are stateless, so logout only clears the cookie; outstanding
/// tokens expire on their own.
async fn logout(headers: HeaderMap) -> Result<Response, UserError> {
    AuditEvent::new(None, "user.logout", None, AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .with_user_agent(extract_user_agent(&headers))
        .log();

    let cookie = clear_cookie_header()?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response())
}

/// Get the authenticated user's profile
async fn get_profile<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(claims): Extension<JwtClaims>,
) -> UserResult<Json<UserView>> {
    let user_id = parse_subject(&claims)?;
    let user = state.service.get_profile(user_id).await?;
    Ok(Json(user))
}

/// Update the authenticated user's profile
async fn update_profile<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserView>> {
    let user_id = parse_subject(&claims)?;
    let user = state.service.update_profile(user_id, input).await?;
    Ok(Json(user))
}

/// List all users in their public shape
async fn list_users<R: UserRepository>(
    State(state): State<AuthState<R>>,
) -> UserResult<Json<Vec<UserView>>> {
    let users = state.service.list_users().await?;
    Ok(Json(users))
}

/// Create the public auth router (register, login, logout)
pub fn auth_router<R>(state: AuthState<R>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(register::<R>))
        .route("/login", post(login::<R>))
        .route("/logout", post(logout))
        .with_state(state)
}

/// Create the profile router; mount behind JWT auth middleware
pub fn profile_router<R>(state: AuthState<R>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(get_profile::<R>).put(update_profile::<R>))
        .with_state(state)
}

/// Create the users listing router; mount behind JWT auth middleware
pub fn users_router<R>(state: AuthState<R>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_users::<R>))
        .with_state(state)
}
