//! Aggregate statistics queries for the company and admin dashboards.

use sqlx::PgPool;

use skylane_core::types::{DbId, Timestamp};

use crate::models::stats::{CompanyStats, ServiceStats};

/// Provides read-only aggregate queries. Time ranges are half-open
/// `[start, end)`; a `None` bound disables that side of the filter.
pub struct StatsRepo;

impl StatsRepo {
    /// Fleet statistics over the given companies. Flights are range-filtered
    /// by departure, ticket aggregates by purchase time; the active and
    /// completed counters always ignore the range, matching the dashboard's
    /// "current fleet" framing.
    pub async fn company_stats(
        pool: &PgPool,
        company_ids: &[DbId],
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<CompanyStats, sqlx::Error> {
        let (flights, seats_capacity): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(seats_total), 0) FROM flights \
             WHERE company_id = ANY($1) \
               AND ($2::TIMESTAMPTZ IS NULL OR departure >= $2) \
               AND ($3::TIMESTAMPTZ IS NULL OR departure < $3)",
        )
        .bind(company_ids)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        let (active, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE departure > $2), \
                    COUNT(*) FILTER (WHERE departure <= $2) \
             FROM flights WHERE company_id = ANY($1)",
        )
        .bind(company_ids)
        .bind(now)
        .fetch_one(pool)
        .await?;

        let (seats_sold, revenue): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(t.price_paid), 0) \
             FROM tickets t JOIN flights f ON f.id = t.flight_id \
             WHERE f.company_id = ANY($1) AND t.status = 'paid' \
               AND ($2::TIMESTAMPTZ IS NULL OR t.purchased_at >= $2) \
               AND ($3::TIMESTAMPTZ IS NULL OR t.purchased_at < $3)",
        )
        .bind(company_ids)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        let load_factor = if seats_capacity > 0 {
            seats_sold as f64 / seats_capacity as f64
        } else {
            0.0
        };

        Ok(CompanyStats {
            flights,
            active,
            completed,
            passengers: seats_sold,
            revenue,
            seats_capacity,
            seats_sold,
            load_factor,
        })
    }

    /// Service-wide counters for the admin dashboard.
    pub async fn service_stats(
        pool: &PgPool,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<ServiceStats, sqlx::Error> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        let companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(pool)
            .await?;

        let flights: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM flights \
             WHERE ($1::TIMESTAMPTZ IS NULL OR departure >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR departure < $2)",
        )
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        let (tickets, total_sales): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(price_paid) FILTER (WHERE status = 'paid'), 0) \
             FROM tickets \
             WHERE ($1::TIMESTAMPTZ IS NULL OR purchased_at >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR purchased_at < $2)",
        )
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(ServiceStats {
            users,
            companies,
            flights,
            tickets,
            total_sales,
        })
    }
}
