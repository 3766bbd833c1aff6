//! Handler tests for the Users domain
//!
//! These tests drive the auth, profile and users routers over HTTP with an
//! in-memory repository: registration, login, session cookies, and the JWT
//! middleware guarding the protected routes.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware};
use axum_helpers::{JwtAuth, JwtConfig, jwt_auth_middleware};
use domain_users::{
    AuthState, InMemoryUserRepository, UserService, auth_router, profile_router, users_router,
};
use http_body_util::BodyExt;
use serde_json::json;
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

const TEST_SECRET: &str = "a-test-signing-secret-at-least-32-chars";

fn app() -> Router {
    let jwt_auth = JwtAuth::new(&JwtConfig::new(TEST_SECRET));
    let state = AuthState {
        service: UserService::new(InMemoryUserRepository::new()),
        jwt_auth: jwt_auth.clone(),
    };

    let protected = Router::new()
        .nest("/profile", profile_router(state.clone()))
        .nest("/users", users_router(state.clone()))
        .layer(middleware::from_fn_with_state(jwt_auth, jwt_auth_middleware));

    Router::new().nest("/auth", auth_router(state)).merge(protected)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body, set_cookie)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn register(app: &Router, email: &str) -> (StatusCode, serde_json::Value, String) {
    send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Alice", "email": email, "password": "secret123" }),
        ),
    )
    .await
}

/// Pull the token out of a Set-Cookie value like
/// `access_token=<tok>; HttpOnly; ...`
fn cookie_token(set_cookie: &str) -> String {
    set_cookie
        .strip_prefix("access_token=")
        .and_then(|rest| rest.split(';').next())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_register_sets_session_cookie() {
    let app = app();
    let email = TestDataBuilder::from_test_name("register_cookie").email("alice");

    let (status, body, set_cookie) = register(&app, &email).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));

    let object = body.as_object().unwrap();
    assert!(object.contains_key("_id"));
    assert_eq!(body["email"], email);
    assert!(!object.contains_key("passwordHash"));
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = app();
    let email = TestDataBuilder::from_test_name("register_duplicate").email("alice");

    let (status, _, _) = register(&app, &email).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body, _) = register(&app, &email).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "duplicate");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = app();
    let email = TestDataBuilder::from_test_name("register_invalid").email("alice");

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Alice", "email": email, "password": "short" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_then_profile_via_cookie() {
    let app = app();
    let email = TestDataBuilder::from_test_name("login_profile").email("alice");
    register(&app, &email).await;

    let (status, body, set_cookie) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);

    let token = cookie_token(&set_cookie);
    assert!(!token.is_empty());

    // Session cookie authenticates the protected route
    let (status, body, _) = send(
        &app,
        Request::builder()
            .uri("/profile")
            .header(header::COOKIE, format!("access_token={}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);

    // So does the same token as a bearer header
    let (status, _, _) = send(
        &app,
        Request::builder()
            .uri("/profile")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let app = app();
    let email = TestDataBuilder::from_test_name("login_denied").email("alice");
    register(&app, &email).await;

    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": "wrong-password" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // Same response for a wrong password and an unknown account
    assert_eq!(body["error"]["message"], "Invalid email or password");

    let unknown = TestDataBuilder::from_test_name("login_denied").email("nobody");
    let (status, body, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": unknown, "password": "secret123" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();

    for uri in ["/profile", "/users"] {
        let (status, _, _) = send(
            &app,
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} without token", uri);
    }
}

#[tokio::test]
async fn test_update_profile_and_list_users() {
    let app = app();
    let email = TestDataBuilder::from_test_name("update_profile").email("alice");
    let (_, _, set_cookie) = register(&app, &email).await;
    let token = cookie_token(&set_cookie);

    let (status, body, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri("/profile")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "name": "Alicia" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alicia");

    let (status, body, _) = send(
        &app,
        Request::builder()
            .uri("/users")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Alicia");
    assert!(!users[0].as_object().unwrap().contains_key("passwordHash"));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = app();

    let (status, body, set_cookie) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    assert!(set_cookie.starts_with("access_token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
