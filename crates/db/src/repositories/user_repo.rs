//! Repository for the `users` table.

use sqlx::PgPool;

use skylane_core::types::DbId;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, full_name, password_hash, role, is_active, created_at";

/// Provides account lookup and administration operations.
pub struct UserRepo;

impl UserRepo {
    /// Create a user. The caller passes an already-lowercased email and an
    /// argon2 hash; a duplicate email surfaces as a unique violation on
    /// `uq_users_email`.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        full_name: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, full_name, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(full_name)
            .bind(password_hash)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every account, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Block or unblock an account.
    ///
    /// Returns `true` if the user existed and was updated.
    pub async fn set_active(pool: &PgPool, id: DbId, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change an account's stored role.
    pub async fn set_role(pool: &PgPool, id: DbId, role: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
