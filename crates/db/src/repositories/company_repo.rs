//! Repository for the `companies` and `company_managers` tables.

use sqlx::PgPool;

use skylane_core::types::DbId;

use crate::models::company::Company;

/// Column list for `companies` queries.
const COLUMNS: &str = "id, name, is_active, created_at";

/// Provides company CRUD and manager-assignment operations.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Create a company. A duplicate name surfaces as a unique violation on
    /// `uq_companies_name`.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Company, sqlx::Error> {
        let query = format!("INSERT INTO companies (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Company>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Company>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List every company, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY id");
        sqlx::query_as::<_, Company>(&query).fetch_all(pool).await
    }

    /// All company ids in creation order, for admin-wide fleet scopes.
    pub async fn all_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM companies ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Activate or deactivate a company.
    ///
    /// Returns `true` if the company existed and was updated.
    pub async fn set_active(pool: &PgPool, id: DbId, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE companies SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Link a user to a company as manager. Idempotent: re-assigning an
    /// existing link reports `false`.
    pub async fn assign_manager(
        pool: &PgPool,
        user_id: DbId,
        company_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO company_managers (user_id, company_id) \
             VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_company_managers_user_company DO NOTHING",
        )
        .bind(user_id)
        .bind(company_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Companies managed by a user, oldest link first.
    pub async fn manager_company_ids(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT company_id FROM company_managers WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
