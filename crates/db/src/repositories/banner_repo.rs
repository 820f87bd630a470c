//! Repository for the `banners` table.

use sqlx::PgPool;

use skylane_core::types::DbId;

use crate::models::content::{Banner, NewBanner};

/// Column list for `banners` queries.
const COLUMNS: &str =
    "id, title, image_url, link_url, position, is_active, created_at, updated_at";

/// Provides CRUD operations for promo banners.
pub struct BannerRepo;

impl BannerRepo {
    pub async fn create(pool: &PgPool, new: &NewBanner) -> Result<Banner, sqlx::Error> {
        let query = format!(
            "INSERT INTO banners (title, image_url, link_url, position, is_active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(&new.title)
            .bind(&new.image_url)
            .bind(&new.link_url)
            .bind(new.position)
            .bind(new.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Banner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM banners WHERE id = $1");
        sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active banners in display order, for the public landing page.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Banner>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM banners WHERE is_active = true ORDER BY position ASC, id ASC"
        );
        sqlx::query_as::<_, Banner>(&query).fetch_all(pool).await
    }

    /// Every banner in display order, for the admin view.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Banner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM banners ORDER BY position ASC, id ASC");
        sqlx::query_as::<_, Banner>(&query).fetch_all(pool).await
    }

    /// Overwrite every editable field.
    ///
    /// Returns `false` for an unknown id.
    pub async fn update(pool: &PgPool, id: DbId, new: &NewBanner) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE banners SET title = $2, image_url = $3, link_url = $4, \
             position = $5, is_active = $6, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.image_url)
        .bind(&new.link_url)
        .bind(new.position)
        .bind(new.is_active)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
