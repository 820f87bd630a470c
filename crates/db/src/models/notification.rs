//! Notification feed models.

use serde::Serialize;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `notifications` table. Serialized field names match the
/// REST and ws wire format (`type`, `read`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub user_email: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(rename = "read")]
    pub is_read: bool,
    pub created_at: Timestamp,
}
