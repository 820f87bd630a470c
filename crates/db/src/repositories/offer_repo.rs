//! Repository for the `offers` table.

use sqlx::PgPool;

use skylane_core::types::DbId;

use crate::models::content::{NewOffer, Offer};

/// Column list for `offers` queries.
const COLUMNS: &str = "id, title, subtitle, price_from, flight_ref, tag, description, mode, \
     click_count, position, is_active, created_at, updated_at";

/// Provides CRUD and click counting for offer cards.
pub struct OfferRepo;

impl OfferRepo {
    pub async fn create(pool: &PgPool, new: &NewOffer) -> Result<Offer, sqlx::Error> {
        let query = format!(
            "INSERT INTO offers (title, subtitle, price_from, flight_ref, tag, description, \
             mode, position, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(&new.title)
            .bind(&new.subtitle)
            .bind(new.price_from)
            .bind(&new.flight_ref)
            .bind(&new.tag)
            .bind(&new.description)
            .bind(&new.mode)
            .bind(new.position)
            .bind(new.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Offer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offers WHERE id = $1");
        sqlx::query_as::<_, Offer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active offers in display order, for the public landing page.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Offer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM offers WHERE is_active = true ORDER BY position ASC, id ASC"
        );
        sqlx::query_as::<_, Offer>(&query).fetch_all(pool).await
    }

    /// Every offer in display order, for the admin view.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Offer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offers ORDER BY position ASC, id ASC");
        sqlx::query_as::<_, Offer>(&query).fetch_all(pool).await
    }

    /// Overwrite every editable field. `click_count` is not editable.
    ///
    /// Returns `false` for an unknown id.
    pub async fn update(pool: &PgPool, id: DbId, new: &NewOffer) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE offers SET title = $2, subtitle = $3, price_from = $4, flight_ref = $5, \
             tag = $6, description = $7, mode = $8, position = $9, is_active = $10, \
             updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.subtitle)
        .bind(new.price_from)
        .bind(&new.flight_ref)
        .bind(&new.tag)
        .bind(&new.description)
        .bind(&new.mode)
        .bind(new.position)
        .bind(new.is_active)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a click on an active, interactive offer.
    ///
    /// Returns the new count, or `None` when the offer is unknown, inactive
    /// or informational-only.
    pub async fn record_click(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE offers SET click_count = click_count + 1 \
             WHERE id = $1 AND is_active = true AND mode = 'interactive' \
             RETURNING click_count",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
