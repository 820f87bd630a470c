//! Shared helpers for the API integration tests: app construction, request
//! plumbing, and seed data for users, companies, and flights.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use skylane_api::auth::jwt::JwtConfig;
use skylane_api::config::ServerConfig;
use skylane_api::notifications::NoopDispatcher;
use skylane_api::router::build_app_router;
use skylane_api::state::AppState;
use skylane_api::ws::WsManager;
use skylane_core::reminders::ReminderConfig;
use skylane_core::roles::Role;
use skylane_core::throttle::MemoryThrottle;
use skylane_core::types::DbId;
use skylane_db::models::flight::{Flight, NewFlight};
use skylane_db::repositories::{CompanyRepo, FlightRepo, UserRepo};

/// Password used for every account the tests register.
pub const TEST_PASSWORD: &str = "window-seat-7A";

/// Build a test `ServerConfig` with safe defaults.
///
/// The purchase throttle window is zero (disabled) so rapid-fire test
/// requests are never rate limited; tests that exercise the throttle build
/// their own config with [`test_config_with_throttle`].
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-key".to_string(),
            access_token_expiry_mins: 60,
        },
        purchase_throttle_secs: 0,
        reminders: ReminderConfig::default(),
    }
}

/// A test config whose purchase throttle is live with the given window.
pub fn test_config_with_throttle(window_secs: u64) -> ServerConfig {
    let mut config = test_config();
    config.purchase_throttle_secs = window_secs;
    config
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Tests go through the same `build_app_router` as `main.rs`, so CORS,
/// request IDs, timeouts, and panic recovery behave exactly as in
/// production. Notifications are dispatched to a no-op sink; WebSocket
/// delivery has its own unit tests.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

/// Same as [`build_test_app`] but with a caller-supplied config, for tests
/// that need a live throttle window or different JWT settings.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let throttle_window = Duration::from_secs(config.purchase_throttle_secs);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        throttle: Arc::new(MemoryThrottle::new(throttle_window)),
        dispatcher: Arc::new(NoopDispatcher),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a GET request with a bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body, no authentication.
pub async fn post_json(app: Router, path: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body and a bearer token.
pub async fn post_json_auth(app: Router, path: &str, body: Value, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a bodyless POST request with a bearer token.
pub async fn post_auth(app: Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a PUT request with a JSON body and a bearer token.
pub async fn put_json_auth(app: Router, path: &str, body: Value, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a DELETE request with a bearer token.
pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body to completion and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body to completion as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Register a user through the API with [`TEST_PASSWORD`].
pub async fn register_user(app: &Router, email: &str) {
    let body = json!({
        "email": email,
        "password": TEST_PASSWORD,
        "full_name": "Test User",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Log in through the API and return the access token.
pub async fn login_token(app: &Router, email: &str) -> String {
    let body = json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Register a user and return their token. Role defaults to `user`.
pub async fn user_token(app: &Router, email: &str) -> String {
    register_user(app, email).await;
    login_token(app, email).await
}

/// Register a user, promote them to the given role directly in the
/// database, and return a token carrying the new role.
pub async fn role_token(app: &Router, pool: &PgPool, email: &str, role: Role) -> String {
    register_user(app, email).await;
    let user = UserRepo::find_by_email(pool, email).await.unwrap().unwrap();
    UserRepo::set_role(pool, user.id, role.as_str()).await.unwrap();
    login_token(app, email).await
}

/// Register an admin and return their token.
pub async fn admin_token(app: &Router, pool: &PgPool, email: &str) -> String {
    role_token(app, pool, email, Role::Admin).await
}

/// Register a manager scoped to a freshly created company.
///
/// Returns the token (with the company id in its claims) and the company id.
pub async fn manager_token(
    app: &Router,
    pool: &PgPool,
    email: &str,
    company_name: &str,
) -> (String, DbId) {
    register_user(app, email).await;
    let user = UserRepo::find_by_email(pool, email).await.unwrap().unwrap();
    let company = CompanyRepo::create(pool, company_name).await.unwrap();
    CompanyRepo::assign_manager(pool, user.id, company.id)
        .await
        .unwrap();
    UserRepo::set_role(pool, user.id, Role::CompanyManager.as_str())
        .await
        .unwrap();
    let token = login_token(app, email).await;
    (token, company.id)
}

/// Insert a flight departing `departs_in_hours` from now with all seats
/// open. Negative hours seed an already-departed flight.
pub async fn seed_flight(
    pool: &PgPool,
    company_id: Option<DbId>,
    flight_number: &str,
    seats: i32,
    departs_in_hours: i64,
) -> Flight {
    let departure = Utc::now() + chrono::Duration::hours(departs_in_hours);
    FlightRepo::create(
        pool,
        &NewFlight {
            airline: "Skylane Air".to_string(),
            flight_number: flight_number.to_string(),
            origin: "VIE".to_string(),
            destination: "LIS".to_string(),
            departure,
            arrival: departure + chrono::Duration::hours(3),
            price: 120.0,
            seats_total: seats,
            seats_available: seats,
            stops: 0,
            company_id,
        },
    )
    .await
    .expect("flight insert should succeed")
}
