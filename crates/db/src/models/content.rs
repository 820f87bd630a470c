//! Landing-page content models: banners and offer cards.

use serde::Serialize;
use skylane_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `banners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Banner {
    pub id: DbId,
    pub title: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `offers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Offer {
    pub id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub price_from: Option<f64>,
    pub flight_ref: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub mode: String,
    pub click_count: i32,
    pub position: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Values for a new banner row.
#[derive(Debug, Clone)]
pub struct NewBanner {
    pub title: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

/// Values for a new offer row.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub title: String,
    pub subtitle: Option<String>,
    pub price_from: Option<f64>,
    pub flight_ref: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub mode: String,
    pub position: i32,
    pub is_active: bool,
}
