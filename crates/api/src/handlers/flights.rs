//! Handlers for the public `/flights` resource (search + detail).

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use skylane_core::error::CoreError;
use skylane_core::types::{DbId, Timestamp};
use skylane_db::models::flight::{Flight, FlightSearch};
use skylane_db::repositories::FlightRepo;

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::{page_count, Page};
use crate::state::AppState;

/// Default page size for the public search.
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for the public search.
const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /flights`. Every filter is optional.
#[derive(Debug, Deserialize)]
pub struct FlightSearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Departure day in `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Minimum number of seats that must still be available.
    pub passengers: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub max_stops: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/flights
///
/// Public flight search, soonest departure first, paginated.
pub async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<FlightSearchParams>,
) -> AppResult<Json<Page<Flight>>> {
    let (page, page_size) = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    if let Some(passengers) = params.passengers {
        if passengers < 1 {
            return Err(AppError::Core(CoreError::Validation(
                "passengers must be at least 1".into(),
            )));
        }
    }

    let day_start = match params.date.as_deref() {
        Some(raw) => Some(parse_departure_day(raw)?),
        None => None,
    };

    let filter = FlightSearch {
        origin: non_empty(params.origin),
        destination: non_empty(params.destination),
        day_start,
        passengers: params.passengers,
        min_price: params.min_price,
        max_price: params.max_price,
        max_stops: params.max_stops,
    };

    let total = FlightRepo::count_search(&state.pool, &filter).await?;
    let pages = page_count(total, page_size);
    let page = page.min(pages);
    let offset = (page - 1) * page_size;

    let items = FlightRepo::search(&state.pool, &filter, page_size, offset).await?;
    Ok(Json(Page::new(items, total, page, page_size)))
}

/// GET /api/v1/flights/{id}
pub async fn flight_detail(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Flight>> {
    let flight = FlightRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Flight", id)))?;
    Ok(Json(flight))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` day into its UTC midnight.
fn parse_departure_day(raw: &str) -> Result<Timestamp, AppError> {
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Core(CoreError::Validation(
            "Invalid date format, expected YYYY-MM-DD".into(),
        ))
    })?;
    Ok(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Treat absent and blank filter values the same.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
