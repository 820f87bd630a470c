//! User account models.

use serde::Serialize;
use skylane_core::roles::Role;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl User {
    /// Parsed role; unknown stored values degrade to the least-privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }
}
