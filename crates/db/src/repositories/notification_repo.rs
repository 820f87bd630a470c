//! Repository for the `notifications` table.

use sqlx::{PgExecutor, PgPool};

use skylane_core::types::DbId;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_email, kind, message, is_read, created_at";

/// Provides CRUD operations for the per-user notification feed.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification, returning the full row for ws delivery.
    ///
    /// Takes an executor so purchase, refund and scheduler flows can write
    /// the row inside their own transaction.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_email: &str,
        kind: &str,
        message: &str,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_email, kind, message) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_email)
            .bind(kind)
            .bind(message)
            .fetch_one(executor)
            .await
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_email: &str,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_email = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_email)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification belongs to the user and was still
    /// unread.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_email: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true \
             WHERE id = $1 AND user_email = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's unread notifications as read.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, user_email: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true \
             WHERE user_email = $1 AND is_read = false",
        )
        .bind(user_email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_email: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_email = $1 AND is_read = false",
        )
        .bind(user_email)
        .fetch_one(pool)
        .await
    }

    /// Fetch one notification owned by a user.
    pub async fn find_for_user(
        pool: &PgPool,
        notification_id: DbId,
        user_email: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1 AND user_email = $2");
        sqlx::query_as::<_, Notification>(&query)
            .bind(notification_id)
            .bind(user_email)
            .fetch_optional(pool)
            .await
    }
}
