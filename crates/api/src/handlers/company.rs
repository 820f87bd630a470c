//! Handlers for the `/company` fleet resource: flight CRUD, seat
//! adjustments, passenger manifests with export, and fleet statistics.
//!
//! Every route requires the `company_manager` or `admin` role. Managers are
//! scoped to the company ids carried in their token; admins see everything.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use skylane_core::error::CoreError;
use skylane_core::notify;
use skylane_core::roles::Role;
use skylane_core::types::{DbId, Timestamp};
use skylane_db::models::flight::{
    CompanyFlightRow, CompanyFlightSort, Flight, FlightEdit, FlightStatusFilter, NewFlight,
};
use skylane_db::models::stats::CompanyStats;
use skylane_db::repositories::{CompanyRepo, FlightRepo, NotificationRepo, StatsRepo, TicketRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::stats_time_range;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::PageParams;
use crate::response::{page_count, Page};
use crate::state::AppState;

/// Default page size for the fleet listing.
const DEFAULT_PAGE_SIZE: i64 = 25;

/// Maximum page size for the fleet listing.
const MAX_PAGE_SIZE: i64 = 200;

/// Bound on a manual seat adjustment, in either direction.
const MAX_SEAT_DELTA: i32 = 1000;

/// Column order for the passenger export.
const EXPORT_HEADER: [&str; 8] = [
    "confirmation_id",
    "user_email",
    "status",
    "purchased_at",
    "price_paid",
    "company_name",
    "origin",
    "destination",
];

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /company/flights`.
#[derive(Debug, Deserialize)]
pub struct FleetListParams {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Request body for `POST /company/flights`.
#[derive(Debug, Deserialize)]
pub struct CreateFlightRequest {
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    pub departure: Option<Timestamp>,
    pub arrival: Option<Timestamp>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub seats_total: i32,
    pub seats_available: Option<i32>,
    #[serde(default)]
    pub stops: i32,
}

/// Request body for `PUT /company/flights/{id}`. Absent fields keep their
/// current values.
#[derive(Debug, Deserialize)]
pub struct UpdateFlightRequest {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<Timestamp>,
    pub arrival: Option<Timestamp>,
    pub price: Option<f64>,
    pub seats_total: Option<i32>,
    /// Raw JSON so a non-integer value gets a field-specific error instead
    /// of a body-wide deserialization failure.
    pub seats_available: Option<serde_json::Value>,
}

/// Query parameters for `POST /company/flights/{id}/seats-adjust`.
#[derive(Debug, Deserialize)]
pub struct SeatsAdjustParams {
    pub delta: Option<i32>,
}

/// Query parameters for the passenger export.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub fmt: Option<String>,
}

/// Query parameters for `GET /company/stats`.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub range: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /company/flights`
///
/// Paginated fleet listing with a status filter (`all`, `active`,
/// `completed`) and a sort order. A requested page past the end snaps back
/// to the last page.
pub async fn list_fleet(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Query(params): Query<FleetListParams>,
) -> AppResult<Json<Page<CompanyFlightRow>>> {
    let (page, page_size) = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let status = match params.status.as_deref() {
        None => FlightStatusFilter::All,
        Some(value) => FlightStatusFilter::from_param(value)
            .ok_or_else(|| CoreError::Validation("Invalid status filter".into()))?,
    };
    let sort = CompanyFlightSort::from_param(params.sort.as_deref().unwrap_or(""));

    let scope = fleet_scope(&user);
    if scope.is_some_and(<[DbId]>::is_empty) {
        return Ok(Json(Page::new(Vec::new(), 0, page, page_size)));
    }

    let now = Utc::now();
    let total = FlightRepo::count_for_company(&state.pool, scope, status, now).await?;
    let page = page.min(page_count(total, page_size));
    let offset = (page - 1) * page_size;
    let rows =
        FlightRepo::list_for_company(&state.pool, scope, status, now, sort, page_size, offset)
            .await?;
    Ok(Json(Page::new(rows, total, page, page_size)))
}

/// `POST /company/flights`
///
/// Create a flight under the caller's first company. Admins are rejected:
/// a flight always belongs to the company its manager acts for.
pub async fn create_flight(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(req): Json<CreateFlightRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if user.role == Role::Admin {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin cannot create flights via this endpoint".into(),
        )));
    }
    let company_id = *user
        .company_ids
        .first()
        .ok_or_else(|| CoreError::Validation("No company mapped for manager".into()))?;
    let (departure, arrival) = match (req.departure, req.arrival) {
        (Some(departure), Some(arrival)) => (departure, arrival),
        _ => {
            return Err(AppError::Core(CoreError::Validation(
                "departure and arrival are required".into(),
            )))
        }
    };
    if arrival <= departure {
        return Err(AppError::Core(CoreError::Validation(
            "arrival must be after departure".into(),
        )));
    }
    // A fresh flight starts fully open unless the payload narrows it.
    let seats_available = req.seats_available.unwrap_or(req.seats_total);

    let flight = FlightRepo::create(
        &state.pool,
        &NewFlight {
            airline: req.airline,
            flight_number: req.flight_number,
            origin: req.origin,
            destination: req.destination,
            departure,
            arrival,
            price: req.price,
            seats_total: req.seats_total,
            seats_available,
            stops: req.stops,
            company_id: Some(company_id),
        },
    )
    .await?;
    tracing::info!(flight_id = flight.id, company_id, "Flight created");
    Ok(Json(json!({ "id": flight.id })))
}

/// `PUT /company/flights/{id}`
///
/// Partial edit of a future flight. Seat counts are validated against sold
/// tickets, every applied change is recorded, and ticket holders get one
/// grouped notification describing the changes.
pub async fn update_flight(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(flight_id): Path<DbId>,
    Json(req): Json<UpdateFlightRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let flight = fetch_managed_flight(&state, &user, flight_id).await?;
    if flight.departure <= Utc::now() {
        return Err(AppError::Core(CoreError::Conflict(
            "Past flight cannot be edited".into(),
        )));
    }

    let sold = FlightRepo::sold_seats(&state.pool, flight_id).await?;
    let requested_total = req.seats_total.unwrap_or(flight.seats_total);
    if i64::from(requested_total) < sold {
        return Err(AppError::Core(CoreError::Conflict(
            "seats_total cannot be less than already sold seats".into(),
        )));
    }

    let mut changed: Vec<&'static str> = Vec::new();
    let mut summary_parts: Vec<String> = Vec::new();
    let mut edit = FlightEdit {
        airline: flight.airline.clone(),
        flight_number: flight.flight_number.clone(),
        origin: flight.origin.clone(),
        destination: flight.destination.clone(),
        departure: flight.departure,
        arrival: flight.arrival,
        price: flight.price,
        seats_total: flight.seats_total,
        seats_available: flight.seats_available,
        stops: flight.stops,
    };

    apply_field(
        &mut edit.airline,
        req.airline,
        "airline",
        &mut changed,
        &mut summary_parts,
    );
    apply_field(
        &mut edit.flight_number,
        req.flight_number,
        "flight_number",
        &mut changed,
        &mut summary_parts,
    );
    apply_field(
        &mut edit.origin,
        req.origin,
        "origin",
        &mut changed,
        &mut summary_parts,
    );
    apply_field(
        &mut edit.destination,
        req.destination,
        "destination",
        &mut changed,
        &mut summary_parts,
    );
    if let Some(value) = req.departure {
        if value != edit.departure {
            summary_parts.push(format!(
                "departure: {} -> {}",
                edit.departure.to_rfc3339(),
                value.to_rfc3339()
            ));
            edit.departure = value;
            changed.push("departure");
        }
    }
    if let Some(value) = req.arrival {
        if value != edit.arrival {
            summary_parts.push(format!(
                "arrival: {} -> {}",
                edit.arrival.to_rfc3339(),
                value.to_rfc3339()
            ));
            edit.arrival = value;
            changed.push("arrival");
        }
    }
    apply_field(
        &mut edit.price,
        req.price,
        "price",
        &mut changed,
        &mut summary_parts,
    );
    let seats_total_changed = apply_field(
        &mut edit.seats_total,
        req.seats_total,
        "seats_total",
        &mut changed,
        &mut summary_parts,
    );

    // A seats_total change re-derives availability from the sold count; an
    // explicit seats_available below still overrides it.
    if seats_total_changed {
        edit.seats_available = (i64::from(edit.seats_total) - sold).max(0) as i32;
    }

    let mut seats_available_changed = false;
    if let Some(value) = req.seats_available {
        let new_sa = value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| CoreError::Validation("Invalid seats_available".into()))?;
        if i64::from(new_sa) < sold {
            return Err(AppError::Core(CoreError::Conflict(
                "seats_available cannot be less than sold seats".into(),
            )));
        }
        if new_sa > edit.seats_total {
            return Err(AppError::Core(CoreError::Conflict(
                "seats_available cannot exceed seats_total".into(),
            )));
        }
        if new_sa != edit.seats_available {
            summary_parts.push(format!(
                "seats_available: {} -> {}",
                edit.seats_available, new_sa
            ));
            edit.seats_available = new_sa;
            changed.push("seats_available");
            seats_available_changed = true;
        }
    }

    if changed.is_empty() {
        return Ok(Json(json!({ "status": "ok", "changed": changed })));
    }

    let updated = FlightRepo::apply_edit(&state.pool, flight_id, &edit)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict("Seat counts changed concurrently, please retry".into())
        })?;
    tracing::info!(flight_id, fields = ?changed, "Flight updated");

    let summary = notify::change_summary(&summary_parts);
    let holders = TicketRepo::paid_counts_by_user(&state.pool, flight_id).await?;
    let mut notifications = Vec::with_capacity(holders.len());
    for (email, count) in &holders {
        let message = notify::flight_update_message(&updated.flight_number, &summary, *count);
        let notification =
            NotificationRepo::create(&state.pool, email, notify::KIND_FLIGHT_UPDATE, &message)
                .await?;
        notifications.push(notification);
    }
    for notification in &notifications {
        state.dispatcher.deliver(notification).await;
    }

    if seats_total_changed || seats_available_changed {
        state
            .dispatcher
            .broadcast_seats(updated.id, updated.seats_available)
            .await;
    }

    Ok(Json(json!({ "status": "ok", "changed": changed })))
}

/// `DELETE /company/flights/{id}`
///
/// Delete a flight, refunding every paid ticket and notifying the holders.
/// Managers cannot delete a flight that has already departed; admins can.
pub async fn delete_flight(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(flight_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let flight = fetch_managed_flight(&state, &user, flight_id).await?;
    if user.role != Role::Admin && flight.departure <= Utc::now() {
        return Err(AppError::Core(CoreError::Conflict(
            "Past flight cannot be deleted".into(),
        )));
    }

    let summary =
        FlightRepo::delete_with_refunds(&state.pool, flight_id, &flight.flight_number).await?;
    tracing::info!(
        flight_id,
        refunded = summary.refunded,
        "Flight deleted with refunds"
    );
    for notification in &summary.notifications {
        state.dispatcher.deliver(notification).await;
    }
    Ok(Json(json!({
        "status": "deleted",
        "refunded_tickets": summary.refunded,
    })))
}

/// `POST /company/flights/{id}/seats-adjust`
///
/// Shift `seats_available` by `delta` within the sold/total bounds and
/// broadcast the new count to connected clients.
pub async fn adjust_seats(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(flight_id): Path<DbId>,
    Query(params): Query<SeatsAdjustParams>,
) -> AppResult<Json<serde_json::Value>> {
    let delta = params
        .delta
        .ok_or_else(|| CoreError::Validation("delta is required".into()))?;
    if !(-MAX_SEAT_DELTA..=MAX_SEAT_DELTA).contains(&delta) {
        return Err(AppError::Core(CoreError::Validation(
            "delta must be between -1000 and 1000".into(),
        )));
    }
    let flight = fetch_managed_flight(&state, &user, flight_id).await?;
    if delta == 0 {
        return Ok(Json(json!({
            "status": "noop",
            "seats_available": flight.seats_available,
        })));
    }

    let sold = FlightRepo::sold_seats(&state.pool, flight_id).await?;
    let new_value = i64::from(flight.seats_available) + i64::from(delta);
    if new_value < 0 {
        return Err(AppError::Core(CoreError::Conflict(
            "Resulting seats_available would be negative".into(),
        )));
    }
    if new_value > i64::from(flight.seats_total) {
        return Err(AppError::Core(CoreError::Conflict(
            "Resulting seats_available exceeds seats_total".into(),
        )));
    }
    if new_value < sold {
        return Err(AppError::Core(CoreError::Conflict(
            "Resulting seats_available less than sold seats".into(),
        )));
    }

    let seats_available = FlightRepo::adjust_seats(&state.pool, flight_id, delta)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict("Seat counts changed concurrently, please retry".into())
        })?;
    tracing::info!(flight_id, delta, seats_available, "Seats adjusted");
    state
        .dispatcher
        .broadcast_seats(flight_id, seats_available)
        .await;
    Ok(Json(json!({ "status": "ok", "seats_available": seats_available })))
}

/// `GET /company/flights/{id}/passengers`
///
/// Paid-ticket manifest for one flight, oldest purchase first.
pub async fn list_passengers(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(flight_id): Path<DbId>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    fetch_managed_flight(&state, &user, flight_id).await?;
    let tickets = TicketRepo::paid_for_flight(&state.pool, flight_id).await?;
    let manifest = tickets
        .iter()
        .map(|t| {
            json!({
                "confirmation_id": t.confirmation_code,
                "purchased_at": t.purchased_at,
                "user_email": t.user_email,
                "status": t.status,
            })
        })
        .collect();
    Ok(Json(manifest))
}

/// `GET /company/flights/{id}/passengers/export`
///
/// Passenger manifest as a download. `fmt=csv` produces UTF-8 CSV with a
/// byte-order mark so spreadsheet tools detect the encoding; `fmt=xlsx`
/// produces a SpreadsheetML workbook Excel opens directly.
pub async fn export_passengers(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(flight_id): Path<DbId>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let fmt = params.fmt.as_deref().unwrap_or("csv");
    if fmt != "csv" && fmt != "xlsx" {
        return Err(AppError::Core(CoreError::Validation(
            "fmt must be csv or xlsx".into(),
        )));
    }
    let flight = fetch_managed_flight(&state, &user, flight_id).await?;
    let tickets = TicketRepo::paid_for_flight(&state.pool, flight_id).await?;
    let company_name = match flight.company_id {
        Some(id) => CompanyRepo::find_by_id(&state.pool, id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default(),
        None => String::new(),
    };

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(tickets.len() + 1);
    rows.push(EXPORT_HEADER.iter().map(|s| s.to_string()).collect());
    for t in &tickets {
        rows.push(vec![
            t.confirmation_code.clone(),
            t.user_email.clone(),
            t.status.clone(),
            t.purchased_at.to_rfc3339(),
            t.price_paid.to_string(),
            company_name.clone(),
            flight.origin.clone(),
            flight.destination.clone(),
        ]);
    }

    let (body, content_type, filename) = if fmt == "csv" {
        (
            csv_document(&rows),
            "text/csv",
            format!("passengers_f{flight_id}.csv"),
        )
    } else {
        (
            spreadsheet_document(&rows),
            "application/vnd.ms-excel",
            format!("passengers_f{flight_id}.xml"),
        )
    };
    let headers = [
        (CONTENT_TYPE, content_type.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ),
    ];
    Ok((headers, body))
}

/// `GET /company/stats`
///
/// Aggregate fleet statistics over an optional time range (`today`, `week`,
/// `month`; anything else means all time). Admins aggregate every company.
pub async fn fleet_stats(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<CompanyStats>> {
    let company_ids = match user.role {
        Role::Admin => CompanyRepo::all_ids(&state.pool).await?,
        _ => user.company_ids.clone(),
    };
    if company_ids.is_empty() {
        return Ok(Json(CompanyStats::empty()));
    }
    let (start, end) = stats_time_range(params.range.as_deref());
    let stats = StatsRepo::company_stats(&state.pool, &company_ids, start, end, Utc::now()).await?;
    Ok(Json(stats))
}

/// `GET /company/info`
///
/// Companies the caller may act for: every company for admins, the token's
/// scope for managers.
pub async fn company_info(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
) -> AppResult<Json<serde_json::Value>> {
    let companies = match user.role {
        Role::Admin => CompanyRepo::list(&state.pool).await?,
        _ => CompanyRepo::find_by_ids(&state.pool, &user.company_ids).await?,
    };
    let companies: Vec<serde_json::Value> = companies
        .iter()
        .map(|c| json!({ "id": c.id, "name": c.name }))
        .collect();
    Ok(Json(json!({ "companies": companies })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Company ids visible to the caller. `None` lifts the filter entirely
/// (admin); a manager sees the ids carried in their token.
fn fleet_scope(user: &AuthUser) -> Option<&[DbId]> {
    match user.role {
        Role::Admin => None,
        _ => Some(&user.company_ids),
    }
}

/// Fetch a flight and verify the caller may manage it. Managers may only
/// touch flights owned by one of their companies.
async fn fetch_managed_flight(
    state: &AppState,
    user: &AuthUser,
    flight_id: DbId,
) -> AppResult<Flight> {
    let flight = FlightRepo::find_by_id(&state.pool, flight_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Flight", flight_id))?;
    if user.role != Role::Admin {
        let owned = flight
            .company_id
            .is_some_and(|id| user.company_ids.contains(&id));
        if !owned {
            return Err(AppError::Core(CoreError::Forbidden(
                "Not your company flight".into(),
            )));
        }
    }
    Ok(flight)
}

/// Apply an optional new value to `slot`, recording `key: old -> new` when
/// it differs. Returns whether the field changed.
fn apply_field<T: PartialEq + std::fmt::Display>(
    slot: &mut T,
    value: Option<T>,
    key: &'static str,
    changed: &mut Vec<&'static str>,
    summary: &mut Vec<String>,
) -> bool {
    match value {
        Some(new) if new != *slot => {
            summary.push(format!("{key}: {slot} -> {new}"));
            *slot = new;
            changed.push(key);
            true
        }
        _ => false,
    }
}

/// Render rows as CSV: UTF-8 with a leading byte-order mark, CRLF row
/// terminators and minimal quoting.
fn csv_document(rows: &[Vec<String>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"\xef\xbb\xbf");
    for row in rows {
        let line = row
            .iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Quote a CSV field only when it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render rows as a SpreadsheetML (XML Spreadsheet 2003) workbook. Excel
/// and LibreOffice open it without a zip container or extra dependencies.
fn spreadsheet_document(rows: &[Vec<String>]) -> Vec<u8> {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\"?>");
    xml.push_str("<?mso-application progid=\"Excel.Sheet\"?>");
    xml.push_str(concat!(
        "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"",
        " xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">",
    ));
    xml.push_str("<Worksheet ss:Name=\"Passengers\"><Table>");
    for row in rows {
        xml.push_str("<Row>");
        for cell in row {
            xml.push_str("<Cell><Data ss:Type=\"String\">");
            xml.push_str(&xml_escape(cell));
            xml.push_str("</Data></Cell>");
        }
        xml.push_str("</Row>");
    }
    xml.push_str("</Table></Worksheet></Workbook>");
    xml.into_bytes()
}

/// Escape text for XML element content.
fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
