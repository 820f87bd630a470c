//! Handlers for the `/tickets` resource: purchase, listing, cancellation and
//! custom departure reminders.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use skylane_core::booking::{validate_quantity, CancellationPolicy, TicketStatus};
use skylane_core::error::CoreError;
use skylane_core::reminders::{fire_time, validate_custom_hours};
use skylane_core::throttle::ThrottleDecision;
use skylane_core::types::DbId;
use skylane_db::models::flight::Flight;
use skylane_db::models::reminder::TicketReminder;
use skylane_db::models::ticket::{CancelOutcome, PurchaseOutcome, Ticket};
use skylane_db::repositories::{FlightRepo, ReminderRepo, TicketRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{page_count, Page};
use crate::state::AppState;

/// Default page size for `GET /tickets/my`.
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for `GET /tickets/my`.
const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /tickets`.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub flight_id: DbId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Query parameters for `GET /tickets/my`.
#[derive(Debug, Deserialize)]
pub struct MyTicketsParams {
    /// `all` (default) or a concrete status: `paid`, `refunded`, `canceled`.
    pub status_filter: Option<String>,
    /// Confirmation-code prefix filter.
    pub confirmation_id: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Request body for `POST /tickets/{confirmation_id}/reminder`.
#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub hours_before: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets
///
/// Purchase `quantity` tickets on one flight. Seats are reserved atomically;
/// either every ticket is created or none is. The purchase notification and
/// the seat broadcast go out only after the transaction commits.
pub async fn purchase_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<PurchaseRequest>,
) -> AppResult<Json<serde_json::Value>> {
    // 1. Validate quantity bounds.
    validate_quantity(input.quantity)?;

    // 2. Per-user-per-flight throttle. Checked before touching the database
    //    so a rapid double-click cannot start two transactions.
    let decision = state
        .throttle
        .check_and_record(&auth.email, input.flight_id)
        .await;
    if decision == ThrottleDecision::Throttled {
        return Err(AppError::Core(CoreError::RateLimited(
            "Too many purchase attempts, please retry shortly".into(),
        )));
    }

    // 3. Reserve seats and create the ticket rows in one transaction.
    let receipt = match TicketRepo::purchase(
        &state.pool,
        input.flight_id,
        &auth.email,
        input.quantity,
        Utc::now(),
    )
    .await?
    {
        PurchaseOutcome::Purchased(receipt) => receipt,
        PurchaseOutcome::UnknownFlight => {
            return Err(AppError::Core(CoreError::Validation(
                "Flight not found".into(),
            )));
        }
        PurchaseOutcome::InsufficientSeats => {
            return Err(AppError::Core(CoreError::Validation(
                "Not enough seats available".into(),
            )));
        }
    };

    tracing::info!(
        user = %auth.email,
        flight_id = receipt.flight_id,
        quantity = input.quantity,
        seats_available = receipt.seats_available,
        "Tickets purchased"
    );

    // 4. Post-commit pushes: buyer notification + seat broadcast.
    state.dispatcher.deliver(&receipt.notification).await;
    state
        .dispatcher
        .broadcast_seats(receipt.flight_id, receipt.seats_available)
        .await;

    // 5. Response carries every confirmation code; the singular key is
    //    present only for single-ticket purchases.
    let codes: Vec<&str> = receipt
        .tickets
        .iter()
        .map(|t| t.confirmation_code.as_str())
        .collect();
    let mut body = json!({
        "confirmation_ids": codes,
        "quantity": input.quantity,
    });
    if input.quantity == 1 {
        if let Some(ticket) = receipt.tickets.first() {
            body["confirmation_id"] = json!(ticket.confirmation_code);
        }
    }
    Ok(Json(body))
}

/// GET /api/v1/tickets/my
///
/// The caller's tickets, newest first, with embedded flight info and any
/// reminders attached to each ticket.
pub async fn my_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MyTicketsParams>,
) -> AppResult<Json<Page<serde_json::Value>>> {
    let (page, page_size) = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let status = match params.status_filter.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(TicketStatus::from_str(raw)?),
    };
    let status = status.as_ref().map(TicketStatus::as_str);

    let code_prefix = params
        .confirmation_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let total = TicketRepo::count_for_user(&state.pool, &auth.email, status, code_prefix).await?;
    let pages = page_count(total, page_size);
    let page = page.min(pages);
    let offset = (page - 1) * page_size;

    let tickets = TicketRepo::list_for_user(
        &state.pool,
        &auth.email,
        status,
        code_prefix,
        page_size,
        offset,
    )
    .await?;

    // Embedded flight rows and reminders, one query each for the whole page.
    let mut flight_ids: Vec<DbId> = tickets.iter().filter_map(|t| t.flight_id).collect();
    flight_ids.sort_unstable();
    flight_ids.dedup();
    let flights: HashMap<DbId, Flight> = FlightRepo::find_by_ids(&state.pool, &flight_ids)
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();

    let ticket_ids: Vec<DbId> = tickets.iter().map(|t| t.id).collect();
    let mut reminders: HashMap<DbId, Vec<TicketReminder>> = HashMap::new();
    for reminder in ReminderRepo::list_for_tickets(&state.pool, &ticket_ids).await? {
        reminders.entry(reminder.ticket_id).or_default().push(reminder);
    }

    let items = tickets
        .iter()
        .map(|t| {
            let flight = t.flight_id.and_then(|id| flights.get(&id));
            let ticket_reminders = reminders
                .get(&t.id)
                .map(|r| r.as_slice())
                .unwrap_or_default();
            json!({
                "confirmation_id": t.confirmation_code,
                "status": t.status,
                "flight_id": t.flight_id,
                "email": t.user_email,
                "purchased_at": t.purchased_at,
                "price_paid": t.price_paid,
                "flight": flight,
                "reminders": ticket_reminders,
            })
        })
        .collect();

    Ok(Json(Page::new(items, total, page, page_size)))
}

/// GET /api/v1/tickets/{confirmation_id}
///
/// Ticket detail by exact confirmation code. Any authenticated caller may
/// look up a code; the code itself is the secret.
pub async fn ticket_detail(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(confirmation_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let ticket = TicketRepo::find_by_code(&state.pool, &confirmation_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Ticket", &confirmation_id)))?;

    Ok(Json(json!({
        "confirmation_id": ticket.confirmation_code,
        "status": ticket.status,
        "flight_id": ticket.flight_id,
        "email": ticket.user_email,
        "purchased_at": ticket.purchased_at,
        "price_paid": ticket.price_paid,
    })))
}

/// POST /api/v1/tickets/{confirmation_id}/cancel
///
/// Cancel a paid ticket. Outside the refund cutoff the seat is released and
/// the status becomes `refunded`; inside it the seat stays sold and the
/// status becomes `canceled`. Repeat cancels echo the settled status.
pub async fn cancel_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(confirmation_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let ticket = find_owned_ticket(&state, &auth, &confirmation_id).await?;

    // Terminal states are idempotent.
    let current = parse_status(&ticket)?;
    if current.is_terminal() {
        return Ok(Json(json!({ "status": ticket.status })));
    }

    let flight_id = ticket
        .flight_id
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Flight no longer exists".into())))?;
    let flight = FlightRepo::find_by_id(&state.pool, flight_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Flight no longer exists".into())))?;

    let disposition = CancellationPolicy::default().disposition(flight.departure, Utc::now())?;

    let outcome = TicketRepo::settle_cancel(
        &state.pool,
        ticket.id,
        Some(flight_id),
        disposition.resulting_status(),
    )
    .await?;

    match outcome {
        CancelOutcome::Applied {
            status,
            seats_available,
        } => {
            tracing::info!(
                user = %auth.email,
                confirmation_id = %ticket.confirmation_code,
                status = %status,
                "Ticket canceled"
            );
            if let Some(seats) = seats_available {
                state.dispatcher.broadcast_seats(flight_id, seats).await;
            }
            Ok(Json(json!({ "status": status })))
        }
        // A racing cancel settled the ticket first; echo its result.
        CancelOutcome::AlreadySettled { status } => Ok(Json(json!({ "status": status }))),
    }
}

/// POST /api/v1/tickets/{confirmation_id}/reminder
///
/// Create or replace the custom departure reminder on a ticket. A ticket
/// carries at most one custom reminder; setting a new offset overwrites the
/// previous one and re-arms it.
pub async fn set_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(confirmation_id): Path<String>,
    Json(input): Json<ReminderRequest>,
) -> AppResult<Json<TicketReminder>> {
    validate_custom_hours(input.hours_before)?;

    let ticket = find_owned_ticket(&state, &auth, &confirmation_id).await?;

    let current = parse_status(&ticket)?;
    if current.is_terminal() {
        return Err(AppError::Core(CoreError::Conflict(
            "Ticket is not active".into(),
        )));
    }

    let flight_id = ticket
        .flight_id
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Flight no longer exists".into())))?;
    let flight = FlightRepo::find_by_id(&state.pool, flight_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Flight no longer exists".into())))?;

    let now = Utc::now();
    if flight.departure <= now {
        return Err(AppError::Core(CoreError::Conflict(
            "Flight has already departed".into(),
        )));
    }

    let scheduled_at = fire_time(flight.departure, input.hours_before);
    if scheduled_at <= now {
        return Err(AppError::Core(CoreError::Conflict(
            "Reminder time has already passed".into(),
        )));
    }

    let reminder = ReminderRepo::upsert_custom(
        &state.pool,
        ticket.id,
        &ticket.user_email,
        input.hours_before as i32,
        scheduled_at,
    )
    .await?;
    Ok(Json(reminder))
}

/// DELETE /api/v1/tickets/{confirmation_id}/reminder/{reminder_id}
///
/// Remove a custom reminder. Standard reminders cannot be deleted.
pub async fn delete_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((confirmation_id, reminder_id)): Path<(String, DbId)>,
) -> AppResult<Json<serde_json::Value>> {
    let ticket = find_owned_ticket(&state, &auth, &confirmation_id).await?;

    let removed = ReminderRepo::delete_custom(&state.pool, reminder_id, ticket.id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::not_found("Reminder", reminder_id)));
    }
    Ok(Json(json!({ "status": "deleted" })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a ticket by confirmation code and verify the caller owns it.
async fn find_owned_ticket(
    state: &AppState,
    auth: &AuthUser,
    confirmation_id: &str,
) -> Result<Ticket, AppError> {
    let ticket = TicketRepo::find_by_code(&state.pool, confirmation_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Ticket", confirmation_id)))?;

    if !ticket.user_email.eq_ignore_ascii_case(&auth.email) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not your ticket".into(),
        )));
    }
    Ok(ticket)
}

/// Parse the stored status column. A value outside the closed set means the
/// row was tampered with out of band.
fn parse_status(ticket: &Ticket) -> Result<TicketStatus, AppError> {
    TicketStatus::from_str(&ticket.status).map_err(|_| {
        AppError::InternalError(format!(
            "Corrupt status {:?} on ticket {}",
            ticket.status, ticket.id
        ))
    })
}
