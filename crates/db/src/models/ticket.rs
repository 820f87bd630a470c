//! Ticket entity models and purchase/cancel outcomes.

use serde::Serialize;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::notification::Notification;

/// A row from the `tickets` table. `flight_id` goes NULL when the flight is
/// deleted; the ticket itself survives.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub confirmation_code: String,
    pub user_email: String,
    pub flight_id: Option<DbId>,
    pub status: String,
    pub price_paid: f64,
    pub purchased_at: Timestamp,
}

/// Result of a purchase attempt.
#[derive(Debug)]
pub enum PurchaseOutcome {
    Purchased(PurchaseReceipt),
    /// The conditional seat reservation matched no row.
    InsufficientSeats,
    UnknownFlight,
}

/// Everything the committed purchase produced. The notification row is
/// returned so the caller can push it over the ws after commit.
#[derive(Debug)]
pub struct PurchaseReceipt {
    pub tickets: Vec<Ticket>,
    pub flight_id: DbId,
    pub flight_number: String,
    pub seats_available: i32,
    pub notification: Notification,
}

/// Result of settling a cancellation.
#[derive(Debug)]
pub enum CancelOutcome {
    /// The ticket moved out of `paid`. `seats_available` carries the new
    /// seat count when a seat was released.
    Applied {
        status: String,
        seats_available: Option<i32>,
    },
    /// The ticket was already terminal; nothing changed.
    AlreadySettled { status: String },
}
