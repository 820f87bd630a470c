//! Departure reminder models.

use serde::Serialize;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::notification::Notification;

/// A row from the `ticket_reminders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketReminder {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_email: String,
    pub hours_before: i32,
    pub kind: String,
    pub scheduled_at: Timestamp,
    pub is_sent: bool,
    pub created_at: Timestamp,
}

/// What one scheduler cycle did. `fired` holds the notification rows created
/// for due reminders, in firing order, for post-commit ws delivery.
#[derive(Debug, Default)]
pub struct CycleOutcome {
    pub materialized: u64,
    pub fired: Vec<Notification>,
}
