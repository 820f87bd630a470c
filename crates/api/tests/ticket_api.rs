//! Integration tests for ticket purchase, listing, and cancellation.
//!
//! The seat ledger is the heart of the system, so these tests lean on
//! end-state assertions: after every purchase or cancel the flight's
//! `seats_available` must add up.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, get, get_auth, post_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

use skylane_db::models::ticket::PurchaseOutcome;
use skylane_db::repositories::TicketRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Purchase `quantity` tickets and return the response JSON, asserting 200.
async fn buy(
    app: &axum::Router,
    token: &str,
    flight_id: i64,
    quantity: i32,
) -> serde_json::Value {
    let body = json!({ "flight_id": flight_id, "quantity": quantity });
    let response = post_json_auth(app.clone(), "/api/v1/tickets", body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Current `seats_available` of a flight, read through the public API.
async fn seats_left(app: &axum::Router, flight_id: i64) -> i64 {
    let response = get(app.clone(), &format!("/api/v1/flights/{flight_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["seats_available"]
        .as_i64()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Purchase
// ---------------------------------------------------------------------------

/// Buying several tickets debits the ledger once and returns one
/// confirmation code per ticket.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_debits_seat_ledger(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    let json = buy(&app, &token, flight.id, 3).await;

    let codes = json["confirmation_ids"].as_array().unwrap();
    assert_eq!(codes.len(), 3);
    assert_eq!(json["quantity"], 3);
    // The singular key only appears on single-ticket purchases.
    assert!(json.get("confirmation_id").is_none());
    // Every code is distinct and well-formed.
    for code in codes {
        let code = code.as_str().unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.starts_with('F'));
    }
    assert_eq!(seats_left(&app, flight.id).await, 3);

    // The buyer got a grouped purchase notification.
    let response = get_auth(app.clone(), "/api/v1/notifications", &token).await;
    let feed = body_json(response).await;
    assert_eq!(feed[0]["type"], "ticket");
    assert_eq!(feed[0]["message"], "Purchased 3 tickets for flight SL100");
}

/// A single-ticket purchase exposes the code under the singular key too.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_single_ticket_echoes_singular_code(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    let json = buy(&app, &token, flight.id, 1).await;

    assert_eq!(json["confirmation_id"], json["confirmation_ids"][0]);
    assert_eq!(seats_left(&app, flight.id).await, 5);
}

/// Quantity is bounded to 1..=10 before the database is touched.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_rejects_out_of_range_quantity(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    for quantity in [0, 11, -3] {
        let body = json!({ "flight_id": flight.id, "quantity": quantity });
        let response = post_json_auth(app.clone(), "/api/v1/tickets", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("quantity must be between 1 and 10"));
    }
    assert_eq!(seats_left(&app, flight.id).await, 6);
}

/// Asking for more seats than remain creates nothing at all.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_is_all_or_nothing(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 2, 48).await;

    let body = json!({ "flight_id": flight.id, "quantity": 5 });
    let response = post_json_auth(app.clone(), "/api/v1/tickets", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Not enough seats available");
    // No partial reservation, no stray ticket rows.
    assert_eq!(seats_left(&app, flight.id).await, 2);
    let response = get_auth(app.clone(), "/api/v1/tickets/my", &token).await;
    assert_eq!(body_json(response).await["total"], 0);
}

/// The ledger holds across a sequence that drains the flight.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_sequence_drains_flight(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 4, 48).await;

    buy(&app, &token, flight.id, 3).await;
    assert_eq!(seats_left(&app, flight.id).await, 1);

    // Two seats requested, one left: rejected, ledger untouched.
    let body = json!({ "flight_id": flight.id, "quantity": 2 });
    let response = post_json_auth(app.clone(), "/api/v1/tickets", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(seats_left(&app, flight.id).await, 1);

    buy(&app, &token, flight.id, 1).await;
    assert_eq!(seats_left(&app, flight.id).await, 0);
}

/// Purchasing on a flight that does not exist is a validation error.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_unknown_flight_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::user_token(&app, "buyer@example.com").await;

    let body = json!({ "flight_id": 999999, "quantity": 1 });
    let response = post_json_auth(app, "/api/v1/tickets", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Flight not found");
}

/// Two buyers racing for the last seat: exactly one wins.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_race_for_last_seat(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let first = common::user_token(&app, "first@example.com").await;
    let second = common::user_token(&app, "second@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 1, 48).await;

    let body = json!({ "flight_id": flight.id, "quantity": 1 });
    let (a, b) = tokio::join!(
        post_json_auth(app.clone(), "/api/v1/tickets", body.clone(), &first),
        post_json_auth(app.clone(), "/api/v1/tickets", body, &second),
    );

    let statuses = [a.status(), b.status()];
    assert!(statuses.contains(&StatusCode::OK));
    assert!(statuses.contains(&StatusCode::BAD_REQUEST));
    assert_eq!(seats_left(&app, flight.id).await, 0);
}

/// The repository-level purchase outcomes, pinned without HTTP in between.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_outcomes_at_ledger_level(pool: PgPool) {
    let flight = common::seed_flight(&pool, None, "SL100", 2, 48).await;

    let outcome = TicketRepo::purchase(&pool, flight.id, "solo@example.com", 2, Utc::now())
        .await
        .unwrap();
    assert_matches!(outcome, PurchaseOutcome::Purchased(ref receipt) if receipt.seats_available == 0);

    let outcome = TicketRepo::purchase(&pool, flight.id, "solo@example.com", 1, Utc::now())
        .await
        .unwrap();
    assert_matches!(outcome, PurchaseOutcome::InsufficientSeats);

    let outcome = TicketRepo::purchase(&pool, 999999, "solo@example.com", 1, Utc::now())
        .await
        .unwrap();
    assert_matches!(outcome, PurchaseOutcome::UnknownFlight);
}

// ---------------------------------------------------------------------------
// Purchase throttle
// ---------------------------------------------------------------------------

/// Inside the throttle window a second purchase on the same flight is
/// rejected with 429; another flight is unaffected.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_throttled_per_user_per_flight(pool: PgPool) {
    let config = common::test_config_with_throttle(30);
    let app = common::build_test_app_with_config(pool.clone(), config);
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;
    let other = common::seed_flight(&pool, None, "SL200", 6, 72).await;

    let body = json!({ "flight_id": flight.id, "quantity": 1 });
    let response = post_json_auth(app.clone(), "/api/v1/tickets", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(app.clone(), "/api/v1/tickets", body, &token).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["error"], "Too many purchase attempts, please retry shortly");

    // The throttle is keyed per flight, not per user globally.
    let body = json!({ "flight_id": other.id, "quantity": 1 });
    let response = post_json_auth(app, "/api/v1/tickets", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Listing and detail
// ---------------------------------------------------------------------------

/// /tickets/my embeds the flight and any reminders, newest purchase first.
#[sqlx::test(migrations = "../db/migrations")]
async fn my_tickets_embeds_flight_info(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    buy(&app, &token, flight.id, 2).await;

    let response = get_auth(app.clone(), "/api/v1/tickets/my", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);

    let item = &json["items"][0];
    assert_eq!(item["status"], "paid");
    assert_eq!(item["email"], "buyer@example.com");
    assert_eq!(item["flight"]["flight_number"], "SL100");
    assert_eq!(item["reminders"].as_array().unwrap().len(), 0);

    // Another user sees nothing.
    let other = common::user_token(&app, "nosy@example.com").await;
    let response = get_auth(app, "/api/v1/tickets/my", &other).await;
    assert_eq!(body_json(response).await["total"], 0);
}

/// Status and confirmation-prefix filters narrow the listing.
#[sqlx::test(migrations = "../db/migrations")]
async fn my_tickets_filters_by_status_and_prefix(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    let json = buy(&app, &token, flight.id, 2).await;
    let code = json["confirmation_ids"][0].as_str().unwrap().to_string();

    // Cancel one ticket far from departure so it settles as refunded.
    let response = post_auth(app.clone(), &format!("/api/v1/tickets/{code}/cancel"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        app.clone(),
        "/api/v1/tickets/my?status_filter=refunded",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["confirmation_id"], code.as_str());

    let response = get_auth(
        app.clone(),
        "/api/v1/tickets/my?status_filter=paid",
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["total"], 1);

    // Prefix match on the confirmation code.
    let prefix = &code[..4];
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/tickets/my?confirmation_id={prefix}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    let items = json["items"].as_array().unwrap();
    assert!(items
        .iter()
        .any(|item| item["confirmation_id"] == code.as_str()));
    assert!(items
        .iter()
        .all(|item| item["confirmation_id"].as_str().unwrap().starts_with(prefix)));

    // An unknown status value is a validation error.
    let response = get_auth(app, "/api/v1/tickets/my?status_filter=teleported", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Ticket detail by exact code; unknown codes are 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn ticket_detail_by_code(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    let json = buy(&app, &token, flight.id, 1).await;
    let code = json["confirmation_id"].as_str().unwrap().to_string();

    let response = get_auth(app.clone(), &format!("/api/v1/tickets/{code}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["confirmation_id"], code.as_str());
    assert_eq!(json["status"], "paid");
    assert_eq!(json["flight_id"], flight.id);
    assert_eq!(json["price_paid"], 120.0);

    let response = get_auth(app, "/api/v1/tickets/F0000000", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Ticket F0000000 not found");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Canceling well before departure refunds the ticket and releases the seat.
#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_before_cutoff_refunds_seat(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 30).await;

    let json = buy(&app, &token, flight.id, 1).await;
    let code = json["confirmation_id"].as_str().unwrap().to_string();
    assert_eq!(seats_left(&app, flight.id).await, 5);

    let path = format!("/api/v1/tickets/{code}/cancel");
    let response = post_auth(app.clone(), &path, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "refunded");
    assert_eq!(seats_left(&app, flight.id).await, 6);

    // Repeating the cancel echoes the settled status and changes nothing.
    let response = post_auth(app.clone(), &path, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "refunded");
    assert_eq!(seats_left(&app, flight.id).await, 6);
}

/// Inside the cutoff the ticket settles as canceled and the seat stays sold.
#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_inside_cutoff_forfeits_seat(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 10).await;

    let json = buy(&app, &token, flight.id, 1).await;
    let code = json["confirmation_id"].as_str().unwrap().to_string();

    let response = post_auth(app.clone(), &format!("/api/v1/tickets/{code}/cancel"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "canceled");
    assert_eq!(seats_left(&app, flight.id).await, 5);
}

/// Only the holder of a ticket may cancel it.
#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_requires_ownership(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let owner = common::user_token(&app, "owner@example.com").await;
    let stranger = common::user_token(&app, "stranger@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, 48).await;

    let json = buy(&app, &owner, flight.id, 1).await;
    let code = json["confirmation_id"].as_str().unwrap().to_string();

    let response =
        post_auth(app.clone(), &format!("/api/v1/tickets/{code}/cancel"), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Not your ticket");

    // The ticket is untouched.
    let response = get_auth(app, &format!("/api/v1/tickets/{code}"), &owner).await;
    assert_eq!(body_json(response).await["status"], "paid");
}

/// Once the flight has departed the ticket can no longer be canceled.
#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_after_departure_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::user_token(&app, "buyer@example.com").await;
    let flight = common::seed_flight(&pool, None, "SL100", 6, -2).await;

    let json = buy(&app, &token, flight.id, 1).await;
    let code = json["confirmation_id"].as_str().unwrap().to_string();

    let response = post_auth(app, &format!("/api/v1/tickets/{code}/cancel"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Flight has already departed");
}
