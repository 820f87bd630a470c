//! Route definitions for the `/tickets` resource.
//!
//! All endpoints require authentication. Tickets are addressed by their
//! confirmation code, not their surrogate id.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// POST   /                          -> purchase_tickets
/// GET    /my                        -> my_tickets
/// GET    /{code}                    -> ticket_detail
/// POST   /{code}/cancel             -> cancel_ticket
/// POST   /{code}/reminder           -> set_reminder
/// DELETE /{code}/reminder/{id}      -> delete_reminder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tickets::purchase_tickets))
        .route("/my", get(tickets::my_tickets))
        .route("/{code}", get(tickets::ticket_detail))
        .route("/{code}/cancel", post(tickets::cancel_ticket))
        .route("/{code}/reminder", post(tickets::set_reminder))
        .route("/{code}/reminder/{id}", delete(tickets::delete_reminder))
}
