//! Flight entity models and fleet listing types.

use serde::Serialize;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::notification::Notification;

/// A row from the `flights` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Flight {
    pub id: DbId,
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: Timestamp,
    pub arrival: Timestamp,
    pub price: f64,
    pub seats_total: i32,
    pub seats_available: i32,
    pub stops: i32,
    pub company_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Values for a new flight row.
#[derive(Debug, Clone)]
pub struct NewFlight {
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: Timestamp,
    pub arrival: Timestamp,
    pub price: f64,
    pub seats_total: i32,
    pub seats_available: i32,
    pub stops: i32,
    pub company_id: Option<DbId>,
}

/// Full set of values applied by a fleet edit. The handler validates seat
/// bounds against sold tickets before building this; the repository re-checks
/// them inside the UPDATE so a concurrent purchase cannot slip through.
#[derive(Debug, Clone)]
pub struct FlightEdit {
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: Timestamp,
    pub arrival: Timestamp,
    pub price: f64,
    pub seats_total: i32,
    pub seats_available: i32,
    pub stops: i32,
}

/// Optional filters for the public flight search.
#[derive(Debug, Clone, Default)]
pub struct FlightSearch {
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Start of the requested departure day (UTC midnight).
    pub day_start: Option<Timestamp>,
    pub passengers: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub max_stops: Option<i32>,
}

/// A fleet listing row: flight columns plus the owning company name and a
/// server-side revenue estimate (price x seats sold).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyFlightRow {
    pub id: DbId,
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: Timestamp,
    pub arrival: Timestamp,
    pub price: f64,
    pub seats_total: i32,
    pub seats_available: i32,
    pub company_id: Option<DbId>,
    pub company_name: Option<String>,
    pub revenue_est: f64,
}

/// What deleting a flight did: how many paid tickets were refunded and the
/// grouped per-user notifications created, returned for post-commit push.
#[derive(Debug, Default)]
pub struct RefundSummary {
    pub refunded: u64,
    pub notifications: Vec<Notification>,
}

/// Status filter for fleet listings: `active` is a future departure,
/// `completed` a past one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatusFilter {
    All,
    Active,
    Completed,
}

impl FlightStatusFilter {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Sort orders accepted by the fleet listing. `CreatedDesc` sorts by the
/// surrogate id. Unknown parameters fall back to `DepartureAsc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyFlightSort {
    DepartureAsc,
    DepartureDesc,
    ArrivalAsc,
    ArrivalDesc,
    PriceAsc,
    PriceDesc,
    SeatsAvailableDesc,
    SeatsAvailableAsc,
    CreatedDesc,
    RevenueEstDesc,
    RevenueEstAsc,
}

impl CompanyFlightSort {
    pub fn from_param(value: &str) -> Self {
        match value {
            "departure_desc" => Self::DepartureDesc,
            "arrival_asc" => Self::ArrivalAsc,
            "arrival_desc" => Self::ArrivalDesc,
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "seats_available_desc" => Self::SeatsAvailableDesc,
            "seats_available_asc" => Self::SeatsAvailableAsc,
            "created_desc" => Self::CreatedDesc,
            "revenue_est_desc" => Self::RevenueEstDesc,
            "revenue_est_asc" => Self::RevenueEstAsc,
            _ => Self::DepartureAsc,
        }
    }

    /// ORDER BY clause for the fleet listing query. Values are fixed strings,
    /// never caller input.
    pub fn order_clause(&self) -> &'static str {
        match self {
            Self::DepartureAsc => "f.departure ASC",
            Self::DepartureDesc => "f.departure DESC",
            Self::ArrivalAsc => "f.arrival ASC",
            Self::ArrivalDesc => "f.arrival DESC",
            Self::PriceAsc => "f.price ASC",
            Self::PriceDesc => "f.price DESC",
            Self::SeatsAvailableDesc => "f.seats_available DESC",
            Self::SeatsAvailableAsc => "f.seats_available ASC",
            Self::CreatedDesc => "f.id DESC",
            Self::RevenueEstDesc => "f.price * (f.seats_total - f.seats_available) DESC",
            Self::RevenueEstAsc => "f.price * (f.seats_total - f.seats_available) ASC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_known_values_and_falls_back() {
        assert_eq!(
            CompanyFlightSort::from_param("revenue_est_desc"),
            CompanyFlightSort::RevenueEstDesc
        );
        assert_eq!(
            CompanyFlightSort::from_param("nonsense"),
            CompanyFlightSort::DepartureAsc
        );
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        assert_eq!(
            FlightStatusFilter::from_param("active"),
            Some(FlightStatusFilter::Active)
        );
        assert_eq!(FlightStatusFilter::from_param("upcoming"), None);
    }
}
