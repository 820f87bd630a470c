//! Integration tests for the notification inbox endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Purchase one ticket so the buyer receives a purchase notification.
async fn buy_one(app: &axum::Router, token: &str, flight_id: i64) {
    let body = json!({ "flight_id": flight_id, "quantity": 1 });
    let response = post_json_auth(app.clone(), "/api/v1/tickets", body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn unread(app: &axum::Router, token: &str) -> i64 {
    let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["unread"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// The feed lists the caller's notifications newest first, unread counted.
#[sqlx::test(migrations = "../db/migrations")]
async fn feed_lists_newest_first(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let first = common::seed_flight(&pool, None, "SL100", 6, 48).await;
    let second = common::seed_flight(&pool, None, "SL200", 6, 72).await;

    buy_one(&app, &token, first.id).await;
    buy_one(&app, &token, second.id).await;

    let response = get_auth(app.clone(), "/api/v1/notifications", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let feed = body_json(response).await;
    let items = feed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "Purchased 1 ticket for flight SL200");
    assert_eq!(items[1]["message"], "Purchased 1 ticket for flight SL100");
    assert_eq!(items[0]["type"], "ticket");
    assert_eq!(items[0]["read"], false);
    // The recipient column stays internal.
    assert!(items[0].get("user_email").is_none());

    assert_eq!(unread(&app, &token).await, 2);

    // The limit parameter caps the feed.
    let response = get_auth(app.clone(), "/api/v1/notifications?limit=1", &token).await;
    let feed = body_json(response).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);

    // Another user's feed is empty.
    let other = common::user_token(&app, "other@example.com").await;
    let response = get_auth(app, "/api/v1/notifications", &other).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
}

/// Marking one notification read is idempotent and scoped to the owner.
#[sqlx::test(migrations = "../db/migrations")]
async fn mark_read_is_idempotent_and_owned(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;
    buy_one(&app, &token, flight.id).await;

    let response = get_auth(app.clone(), "/api/v1/notifications", &token).await;
    let id = body_json(response).await[0]["id"].as_i64().unwrap();

    let path = format!("/api/v1/notifications/{id}/read");
    let response = post_auth(app.clone(), &path, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(unread(&app, &token).await, 0);

    // Marking again succeeds without changing anything.
    let response = post_auth(app.clone(), &path, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Someone else's notification reads as missing, not forbidden.
    let other = common::user_token(&app, "other@example.com").await;
    let response = post_auth(app.clone(), &path, &other).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], format!("Notification {id} not found"));

    // An id that never existed is also 404.
    let response = post_auth(app, "/api/v1/notifications/999999/read", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// mark-all-read clears the unread count in one call.
#[sqlx::test(migrations = "../db/migrations")]
async fn mark_all_read_clears_unread(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let first = common::seed_flight(&pool, None, "SL100", 6, 48).await;
    let second = common::seed_flight(&pool, None, "SL200", 6, 72).await;
    buy_one(&app, &token, first.id).await;
    buy_one(&app, &token, second.id).await;
    assert_eq!(unread(&app, &token).await, 2);

    let response = post_auth(app.clone(), "/api/v1/notifications/mark-all-read", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(unread(&app, &token).await, 0);

    let response = get_auth(app, "/api/v1/notifications", &token).await;
    let feed = body_json(response).await;
    assert!(feed
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["read"] == true));
}
