#![allow(dead_code)]

use chrono::{Duration, Utc};
use sqlx::PgPool;

use skylane_core::types::{DbId, Timestamp};
use skylane_db::models::flight::NewFlight;
use skylane_db::repositories::FlightRepo;

pub fn flight_fixture(number: &str, departure: Timestamp, seats: i32) -> NewFlight {
    NewFlight {
        airline: "Skylane".to_string(),
        flight_number: number.to_string(),
        origin: "AMS".to_string(),
        destination: "LIS".to_string(),
        departure,
        arrival: departure + Duration::hours(3),
        price: 120.0,
        seats_total: seats,
        seats_available: seats,
        stops: 0,
        company_id: None,
    }
}

/// Insert a flight departing `departs_in_hours` from now with all seats open.
pub async fn seed_flight(pool: &PgPool, number: &str, departs_in_hours: i64, seats: i32) -> DbId {
    let departure = Utc::now() + Duration::hours(departs_in_hours);
    FlightRepo::create(pool, &flight_fixture(number, departure, seats))
        .await
        .unwrap()
        .id
}

pub async fn seats_available(pool: &PgPool, flight_id: DbId) -> i32 {
    sqlx::query_scalar("SELECT seats_available FROM flights WHERE id = $1")
        .bind(flight_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn paid_ticket_count(pool: &PgPool, flight_id: DbId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE flight_id = $1 AND status = 'paid'")
        .bind(flight_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
