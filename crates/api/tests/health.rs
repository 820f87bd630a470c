//! Integration tests for the health endpoint and cross-cutting HTTP
//! behaviour (request IDs, CORS).

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health reports ok with a healthy database
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn health_reports_ok_with_live_database(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    // Version comes from the crate manifest and is never empty.
    assert!(!json["version"].as_str().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: unknown routes fall through to 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Same for paths under the API prefix.
    let response = get(app, "/api/v1/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: every response carries a generated x-request-id
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn responses_carry_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header must be set")
        .to_str()
        .unwrap();
    // Generated IDs are UUIDs: 36 chars including hyphens.
    assert_eq!(request_id.len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight allows the configured origin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_preflight_allows_configured_origin(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/flights")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .expect("allow-origin header must be set"),
        "http://localhost:5173"
    );
    assert_eq!(
        headers
            .get("access-control-allow-credentials")
            .expect("allow-credentials header must be set"),
        "true"
    );
    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("allow-methods header must be set")
        .to_str()
        .unwrap();
    assert!(allow_methods.contains("GET"), "got: {allow_methods}");
    assert!(allow_methods.contains("PUT"), "got: {allow_methods}");
}
