mod common;

use sqlx::PgPool;

use skylane_db::models::ticket::PurchaseOutcome;
use skylane_db::repositories::{FlightRepo, TicketRepo};

// ---------------------------------------------------------------------------
// Conditional reservation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn reserve_decrements_and_reports_remaining(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL100", 48, 10).await;

    let left = FlightRepo::reserve_seats(&pool, flight_id, 3).await.unwrap();
    assert_eq!(left, Some(7));
    assert_eq!(common::seats_available(&pool, flight_id).await, 7);
}

#[sqlx::test(migrations = "./migrations")]
async fn reserve_refuses_when_fewer_seats_remain(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL100", 48, 2).await;

    let left = FlightRepo::reserve_seats(&pool, flight_id, 5).await.unwrap();
    assert_eq!(left, None);
    // An exact-fit request still goes through.
    assert_eq!(
        FlightRepo::reserve_seats(&pool, flight_id, 2).await.unwrap(),
        Some(0)
    );
    assert_eq!(
        FlightRepo::reserve_seats(&pool, flight_id, 1).await.unwrap(),
        None
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn reserve_unknown_flight_matches_nothing(pool: PgPool) {
    let left = FlightRepo::reserve_seats(&pool, 9999, 1).await.unwrap();
    assert_eq!(left, None);
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn release_is_clamped_at_seats_total(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL100", 48, 10).await;
    FlightRepo::reserve_seats(&pool, flight_id, 4).await.unwrap();

    let after = FlightRepo::release_seats(&pool, flight_id, 2).await.unwrap();
    assert_eq!(after, Some(8));

    // Releasing more than was ever taken cannot push past capacity.
    let after = FlightRepo::release_seats(&pool, flight_id, 99).await.unwrap();
    assert_eq!(after, Some(10));
}

// ---------------------------------------------------------------------------
// Database-enforced bounds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn check_constraint_rejects_out_of_bounds_writes(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL100", 48, 5).await;

    let err = sqlx::query("UPDATE flights SET seats_available = seats_total + 1 WHERE id = $1")
        .bind(flight_id)
        .execute(&pool)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db) => assert_eq!(db.code().as_deref(), Some("23514")),
        other => panic!("expected a check violation, got {other:?}"),
    }

    let err = sqlx::query("UPDATE flights SET seats_available = -1 WHERE id = $1")
        .bind(flight_id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(_)));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn racing_purchases_for_the_last_seats_never_oversell(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL100", 48, 3).await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..6 {
        let pool = pool.clone();
        tasks.spawn(async move {
            let email = format!("racer{i}@example.com");
            TicketRepo::purchase(&pool, flight_id, &email, 1, chrono::Utc::now()).await
        });
    }

    let mut purchased = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            PurchaseOutcome::Purchased(_) => purchased += 1,
            PurchaseOutcome::InsufficientSeats => rejected += 1,
            PurchaseOutcome::UnknownFlight => panic!("flight should exist"),
        }
    }

    assert_eq!(purchased, 3);
    assert_eq!(rejected, 3);
    assert_eq!(common::seats_available(&pool, flight_id).await, 0);
    assert_eq!(common::paid_ticket_count(&pool, flight_id).await, 3);
}
