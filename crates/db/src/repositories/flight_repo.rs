//! Repository for the `flights` table: public search, the seat ledger and
//! fleet management.

use sqlx::{PgExecutor, PgPool};

use skylane_core::notify;
use skylane_core::types::{DbId, Timestamp};

use crate::models::flight::{
    CompanyFlightRow, CompanyFlightSort, Flight, FlightEdit, FlightSearch, FlightStatusFilter,
    NewFlight, RefundSummary,
};
use crate::repositories::NotificationRepo;

/// Column list for `flights` queries.
const COLUMNS: &str = "id, airline, flight_number, origin, destination, departure, arrival, \
     price, seats_total, seats_available, stops, company_id, created_at";

/// Shared WHERE clause for the public search. Every filter is optional; a
/// NULL bind disables it.
const SEARCH_FILTER: &str = "($1::TEXT IS NULL OR origin ILIKE $1) \
     AND ($2::TEXT IS NULL OR destination ILIKE $2) \
     AND ($3::TIMESTAMPTZ IS NULL OR (departure >= $3 AND departure < $3 + INTERVAL '1 day')) \
     AND ($4::INT IS NULL OR seats_available >= $4) \
     AND ($5::DOUBLE PRECISION IS NULL OR price >= $5) \
     AND ($6::DOUBLE PRECISION IS NULL OR price <= $6) \
     AND ($7::INT IS NULL OR stops <= $7)";

/// Provides flight search, seat-ledger and fleet operations.
pub struct FlightRepo;

impl FlightRepo {
    pub async fn create(pool: &PgPool, new: &NewFlight) -> Result<Flight, sqlx::Error> {
        let query = format!(
            "INSERT INTO flights (airline, flight_number, origin, destination, departure, \
             arrival, price, seats_total, seats_available, stops, company_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flight>(&query)
            .bind(&new.airline)
            .bind(&new.flight_number)
            .bind(&new.origin)
            .bind(&new.destination)
            .bind(new.departure)
            .bind(new.arrival)
            .bind(new.price)
            .bind(new.seats_total)
            .bind(new.seats_available)
            .bind(new.stops)
            .bind(new.company_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Flight>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flights WHERE id = $1");
        sqlx::query_as::<_, Flight>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flights for a set of ids, for embedding into ticket listings.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Flight>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flights WHERE id = ANY($1)");
        sqlx::query_as::<_, Flight>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Public search, soonest departure first.
    pub async fn search(
        pool: &PgPool,
        filter: &FlightSearch,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Flight>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flights WHERE {SEARCH_FILTER} \
             ORDER BY departure ASC LIMIT $8 OFFSET $9"
        );
        sqlx::query_as::<_, Flight>(&query)
            .bind(&filter.origin)
            .bind(&filter.destination)
            .bind(filter.day_start)
            .bind(filter.passengers)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.max_stops)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows the same search filter matches.
    pub async fn count_search(pool: &PgPool, filter: &FlightSearch) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM flights WHERE {SEARCH_FILTER}");
        sqlx::query_scalar(&query)
            .bind(&filter.origin)
            .bind(&filter.destination)
            .bind(filter.day_start)
            .bind(filter.passengers)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.max_stops)
            .fetch_one(pool)
            .await
    }

    /// Atomically take `quantity` seats. The WHERE clause is the entire
    /// oversell guard: no row matches when fewer seats remain, and no prior
    /// read is consulted. Returns the new `seats_available`, or `None` when
    /// the reservation did not happen.
    pub async fn reserve_seats<'e>(
        executor: impl PgExecutor<'e>,
        flight_id: DbId,
        quantity: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE flights SET seats_available = seats_available - $2 \
             WHERE id = $1 AND seats_available >= $2 \
             RETURNING seats_available",
        )
        .bind(flight_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await
    }

    /// Return `quantity` seats to the pool, clamped at `seats_total`.
    /// Returns the new `seats_available`, or `None` for an unknown flight.
    pub async fn release_seats<'e>(
        executor: impl PgExecutor<'e>,
        flight_id: DbId,
        quantity: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE flights SET seats_available = LEAST(seats_available + $2, seats_total) \
             WHERE id = $1 \
             RETURNING seats_available",
        )
        .bind(flight_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await
    }

    /// Number of paid tickets currently held against a flight.
    pub async fn sold_seats<'e>(
        executor: impl PgExecutor<'e>,
        flight_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE flight_id = $1 AND status = 'paid'",
        )
        .bind(flight_id)
        .fetch_one(executor)
        .await
    }

    /// Apply a full edit. The UPDATE re-checks the seat bounds against sold
    /// tickets so a purchase racing the edit cannot break the ledger; `None`
    /// means the flight vanished or the guard failed and the caller should
    /// report a conflict.
    pub async fn apply_edit(
        pool: &PgPool,
        flight_id: DbId,
        edit: &FlightEdit,
    ) -> Result<Option<Flight>, sqlx::Error> {
        let query = format!(
            "UPDATE flights SET airline = $2, flight_number = $3, origin = $4, \
             destination = $5, departure = $6, arrival = $7, price = $8, \
             seats_total = $9, seats_available = $10, stops = $11 \
             WHERE id = $1 \
               AND $10 <= $9 \
               AND $10 >= (SELECT COUNT(*) FROM tickets t \
                           WHERE t.flight_id = flights.id AND t.status = 'paid') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flight>(&query)
            .bind(flight_id)
            .bind(&edit.airline)
            .bind(&edit.flight_number)
            .bind(&edit.origin)
            .bind(&edit.destination)
            .bind(edit.departure)
            .bind(edit.arrival)
            .bind(edit.price)
            .bind(edit.seats_total)
            .bind(edit.seats_available)
            .bind(edit.stops)
            .fetch_optional(pool)
            .await
    }

    /// Manually shift `seats_available` by `delta`, bounded below by sold
    /// seats and zero, above by `seats_total`. Returns the new value, or
    /// `None` when any bound would be violated.
    pub async fn adjust_seats(
        pool: &PgPool,
        flight_id: DbId,
        delta: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE flights SET seats_available = seats_available + $2 \
             WHERE id = $1 \
               AND seats_available + $2 >= 0 \
               AND seats_available + $2 <= seats_total \
               AND seats_available + $2 >= \
                   (SELECT COUNT(*) FROM tickets t \
                    WHERE t.flight_id = flights.id AND t.status = 'paid') \
             RETURNING seats_available",
        )
        .bind(flight_id)
        .bind(delta)
        .fetch_optional(pool)
        .await
    }

    /// Delete a flight: refund every paid ticket, drop its pending
    /// reminders, write one grouped notification per affected user and
    /// remove the row, all in one transaction. Ticket rows survive with a
    /// NULL flight reference.
    pub async fn delete_with_refunds(
        pool: &PgPool,
        flight_id: DbId,
        flight_number: &str,
    ) -> Result<RefundSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let per_user: Vec<(String, i64)> = sqlx::query_as(
            "SELECT user_email, COUNT(*) FROM tickets \
             WHERE flight_id = $1 AND status = 'paid' \
             GROUP BY user_email ORDER BY user_email",
        )
        .bind(flight_id)
        .fetch_all(&mut *tx)
        .await?;

        let refunded = sqlx::query(
            "UPDATE tickets SET status = 'refunded' WHERE flight_id = $1 AND status = 'paid'",
        )
        .bind(flight_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "DELETE FROM ticket_reminders r USING tickets t \
             WHERE r.ticket_id = t.id AND t.flight_id = $1 AND r.is_sent = false",
        )
        .bind(flight_id)
        .execute(&mut *tx)
        .await?;

        let mut notifications = Vec::with_capacity(per_user.len());
        for (email, count) in &per_user {
            let message = notify::flight_cancel_message(flight_number, *count);
            let notification =
                NotificationRepo::create(&mut *tx, email, notify::KIND_FLIGHT_CANCEL, &message)
                    .await?;
            notifications.push(notification);
        }

        sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(flight_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RefundSummary {
            refunded,
            notifications,
        })
    }

    /// Fleet listing with company names and revenue estimates. `scope` is
    /// the visible company ids; `None` lifts the filter entirely (admin).
    pub async fn list_for_company(
        pool: &PgPool,
        scope: Option<&[DbId]>,
        status: FlightStatusFilter,
        now: Timestamp,
        sort: CompanyFlightSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CompanyFlightRow>, sqlx::Error> {
        let order = sort.order_clause();
        let query = format!(
            "SELECT f.id, f.airline, f.flight_number, f.origin, f.destination, \
             f.departure, f.arrival, f.price, f.seats_total, f.seats_available, \
             f.company_id, c.name AS company_name, \
             f.price * (f.seats_total - f.seats_available) AS revenue_est \
             FROM flights f LEFT JOIN companies c ON c.id = f.company_id \
             WHERE ($1::BIGINT[] IS NULL OR f.company_id = ANY($1)) \
               AND ($2 = 'all' OR ($2 = 'active' AND f.departure > $3) \
                    OR ($2 = 'completed' AND f.departure <= $3)) \
             ORDER BY {order} LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, CompanyFlightRow>(&query)
            .bind(scope)
            .bind(status.as_str())
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows the same fleet scope and status filter match.
    pub async fn count_for_company(
        pool: &PgPool,
        scope: Option<&[DbId]>,
        status: FlightStatusFilter,
        now: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM flights f \
             WHERE ($1::BIGINT[] IS NULL OR f.company_id = ANY($1)) \
               AND ($2 = 'all' OR ($2 = 'active' AND f.departure > $3) \
                    OR ($2 = 'completed' AND f.departure <= $3))",
        )
        .bind(scope)
        .bind(status.as_str())
        .bind(now)
        .fetch_one(pool)
        .await
    }
}
