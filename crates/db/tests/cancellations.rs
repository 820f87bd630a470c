mod common;

use chrono::Utc;
use sqlx::PgPool;

use skylane_core::booking::TicketStatus;
use skylane_core::types::DbId;
use skylane_db::models::ticket::{CancelOutcome, PurchaseOutcome};
use skylane_db::repositories::TicketRepo;

async fn buy_one(pool: &PgPool, flight_id: DbId, email: &str) -> DbId {
    let outcome = TicketRepo::purchase(pool, flight_id, email, 1, Utc::now())
        .await
        .unwrap();
    match outcome {
        PurchaseOutcome::Purchased(receipt) => receipt.tickets[0].id,
        other => panic!("expected a purchase, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Refund path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn refund_releases_the_seat_in_the_same_transaction(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL300", 48, 5).await;
    let ticket_id = buy_one(&pool, flight_id, "a@example.com").await;
    assert_eq!(common::seats_available(&pool, flight_id).await, 4);

    let outcome =
        TicketRepo::settle_cancel(&pool, ticket_id, Some(flight_id), TicketStatus::Refunded)
            .await
            .unwrap();
    match outcome {
        CancelOutcome::Applied {
            status,
            seats_available,
        } => {
            assert_eq!(status, "refunded");
            assert_eq!(seats_available, Some(5));
        }
        other => panic!("expected Applied, got {other:?}"),
    }
    assert_eq!(common::seats_available(&pool, flight_id).await, 5);
}

// ---------------------------------------------------------------------------
// Forfeit path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn late_cancel_keeps_the_seat_sold(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL301", 10, 5).await;
    let ticket_id = buy_one(&pool, flight_id, "a@example.com").await;

    let outcome =
        TicketRepo::settle_cancel(&pool, ticket_id, Some(flight_id), TicketStatus::Canceled)
            .await
            .unwrap();
    match outcome {
        CancelOutcome::Applied {
            status,
            seats_available,
        } => {
            assert_eq!(status, "canceled");
            assert_eq!(seats_available, None);
        }
        other => panic!("expected Applied, got {other:?}"),
    }
    assert_eq!(common::seats_available(&pool, flight_id).await, 4);
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn settling_twice_reports_the_first_status_without_side_effects(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL302", 48, 5).await;
    let ticket_id = buy_one(&pool, flight_id, "a@example.com").await;

    let first =
        TicketRepo::settle_cancel(&pool, ticket_id, Some(flight_id), TicketStatus::Refunded)
            .await
            .unwrap();
    assert!(matches!(first, CancelOutcome::Applied { .. }));

    // A repeat, even asking for the other terminal status, changes nothing.
    let second =
        TicketRepo::settle_cancel(&pool, ticket_id, Some(flight_id), TicketStatus::Canceled)
            .await
            .unwrap();
    match second {
        CancelOutcome::AlreadySettled { status } => assert_eq!(status, "refunded"),
        other => panic!("expected AlreadySettled, got {other:?}"),
    }
    assert_eq!(common::seats_available(&pool, flight_id).await, 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn racing_cancels_release_exactly_one_seat(pool: PgPool) {
    let flight_id = common::seed_flight(&pool, "SL303", 48, 5).await;
    let ticket_id = buy_one(&pool, flight_id, "a@example.com").await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..4 {
        let pool = pool.clone();
        tasks.spawn(async move {
            TicketRepo::settle_cancel(&pool, ticket_id, Some(flight_id), TicketStatus::Refunded)
                .await
        });
    }

    let mut applied = 0;
    let mut settled = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            CancelOutcome::Applied { .. } => applied += 1,
            CancelOutcome::AlreadySettled { .. } => settled += 1,
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(settled, 3);
    assert_eq!(common::seats_available(&pool, flight_id).await, 5);
}
