//! Company and company-manager models.

use serde::Serialize;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// A row from the `company_managers` link table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyManager {
    pub id: DbId,
    pub user_id: DbId,
    pub company_id: DbId,
    pub created_at: Timestamp,
}
