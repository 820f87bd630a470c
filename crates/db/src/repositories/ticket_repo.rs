//! Repository for the `tickets` table: purchase, cancellation and lookups.

use sqlx::{Acquire, PgExecutor, PgPool};

use skylane_core::booking::TicketStatus;
use skylane_core::codes;
use skylane_core::notify;
use skylane_core::types::{DbId, Timestamp};

use crate::models::ticket::{CancelOutcome, PurchaseOutcome, PurchaseReceipt, Ticket};
use crate::repositories::{FlightRepo, NotificationRepo};

/// Column list for `tickets` queries.
const COLUMNS: &str =
    "id, confirmation_code, user_email, flight_id, status, price_paid, purchased_at";

/// Attempts at generating a non-colliding confirmation code before the
/// purchase is abandoned.
const CODE_RETRY_LIMIT: u32 = 3;

/// Provides purchase, cancel and lookup operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Purchase `quantity` tickets in one transaction: reserve the seats
    /// with the conditional ledger UPDATE, insert the ticket rows at the
    /// flight's current price and write the buyer's notification. Nothing
    /// is committed unless every step succeeds.
    pub async fn purchase(
        pool: &PgPool,
        flight_id: DbId,
        user_email: &str,
        quantity: i32,
        now: Timestamp,
    ) -> Result<PurchaseOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let flight: Option<(String, f64)> =
            sqlx::query_as("SELECT flight_number, price FROM flights WHERE id = $1")
                .bind(flight_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((flight_number, price)) = flight else {
            return Ok(PurchaseOutcome::UnknownFlight);
        };

        let Some(seats_available) =
            FlightRepo::reserve_seats(&mut *tx, flight_id, quantity).await?
        else {
            return Ok(PurchaseOutcome::InsufficientSeats);
        };

        let mut tickets = Vec::with_capacity(quantity as usize);
        for _ in 0..quantity {
            let ticket =
                Self::insert_with_fresh_code(&mut tx, flight_id, user_email, price, now).await?;
            tickets.push(ticket);
        }

        let message = notify::purchase_message(quantity, &flight_number);
        let notification =
            NotificationRepo::create(&mut *tx, user_email, notify::KIND_TICKET, &message).await?;

        tx.commit().await?;
        Ok(PurchaseOutcome::Purchased(PurchaseReceipt {
            tickets,
            flight_id,
            flight_number,
            seats_available,
            notification,
        }))
    }

    /// Insert one ticket row, retrying behind a savepoint when the random
    /// confirmation code collides with an existing one.
    async fn insert_with_fresh_code(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        flight_id: DbId,
        user_email: &str,
        price: f64,
        now: Timestamp,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (confirmation_code, user_email, flight_id, status, \
             price_paid, purchased_at) \
             VALUES ($1, $2, $3, 'paid', $4, $5) \
             RETURNING {COLUMNS}"
        );
        let mut attempts = 0;
        loop {
            attempts += 1;
            let code = codes::confirmation_code();
            let mut savepoint = tx.begin().await?;
            let inserted = sqlx::query_as::<_, Ticket>(&query)
                .bind(&code)
                .bind(user_email)
                .bind(flight_id)
                .bind(price)
                .bind(now)
                .fetch_one(&mut *savepoint)
                .await;
            match inserted {
                Ok(ticket) => {
                    savepoint.commit().await?;
                    return Ok(ticket);
                }
                Err(err) if is_code_collision(&err) && attempts < CODE_RETRY_LIMIT => {
                    savepoint.rollback().await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Settle a cancellation decided by the caller. The conditional UPDATE
    /// out of `paid` makes concurrent cancels race safely: exactly one wins
    /// and the loser observes the already-terminal status. A refund releases
    /// the seat in the same transaction.
    pub async fn settle_cancel(
        pool: &PgPool,
        ticket_id: DbId,
        flight_id: Option<DbId>,
        new_status: TicketStatus,
    ) -> Result<CancelOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE tickets SET status = $2 WHERE id = $1 AND status = 'paid'",
        )
        .bind(ticket_id)
        .bind(new_status.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let status: String = sqlx::query_scalar("SELECT status FROM tickets WHERE id = $1")
                .bind(ticket_id)
                .fetch_one(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(CancelOutcome::AlreadySettled { status });
        }

        let mut seats_available = None;
        if new_status == TicketStatus::Refunded {
            if let Some(flight_id) = flight_id {
                seats_available = FlightRepo::release_seats(&mut *tx, flight_id, 1).await?;
            }
        }

        tx.commit().await?;
        Ok(CancelOutcome::Applied {
            status: new_status.as_str().to_string(),
            seats_available,
        })
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE confirmation_code = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// A user's tickets, newest purchase first, with optional status and
    /// confirmation-code-prefix filters.
    pub async fn list_for_user(
        pool: &PgPool,
        user_email: &str,
        status: Option<&str>,
        code_prefix: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets \
             WHERE user_email = $1 \
               AND ($2::TEXT IS NULL OR status = $2) \
               AND ($3::TEXT IS NULL OR confirmation_code ILIKE $3 || '%') \
             ORDER BY purchased_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_email)
            .bind(status)
            .bind(code_prefix)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows the same user filters match.
    pub async fn count_for_user(
        pool: &PgPool,
        user_email: &str,
        status: Option<&str>,
        code_prefix: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE user_email = $1 \
               AND ($2::TEXT IS NULL OR status = $2) \
               AND ($3::TEXT IS NULL OR confirmation_code ILIKE $3 || '%')",
        )
        .bind(user_email)
        .bind(status)
        .bind(code_prefix)
        .fetch_one(pool)
        .await
    }

    /// Paid tickets for a flight, oldest purchase first (passenger list).
    pub async fn paid_for_flight(
        pool: &PgPool,
        flight_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets \
             WHERE flight_id = $1 AND status = 'paid' \
             ORDER BY purchased_at ASC, id ASC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(flight_id)
            .fetch_all(pool)
            .await
    }

    /// Per-user counts of paid tickets on a flight, for grouped refund
    /// notifications.
    pub async fn paid_counts_by_user<'e>(
        executor: impl PgExecutor<'e>,
        flight_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT user_email, COUNT(*) FROM tickets \
             WHERE flight_id = $1 AND status = 'paid' \
             GROUP BY user_email ORDER BY user_email",
        )
        .bind(flight_id)
        .fetch_all(executor)
        .await
    }
}

/// A unique violation on the confirmation-code constraint, the only insert
/// error worth retrying.
fn is_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505")
                && db.constraint() == Some("uq_tickets_confirmation_code")
        }
        _ => false,
    }
}
