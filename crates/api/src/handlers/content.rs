//! Handlers for the `/content` resource: public landing-page banners and
//! offer cards, plus the admin CRUD behind them.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use skylane_core::error::CoreError;
use skylane_core::types::DbId;
use skylane_db::models::content::{NewBanner, NewOffer};
use skylane_db::repositories::{BannerRepo, OfferRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireContentManager;
use crate::state::AppState;

/// Offer display modes accepted by create and update.
const OFFER_MODES: [&str; 2] = ["interactive", "info"];

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /content/admin/banners`.
#[derive(Debug, Deserialize)]
pub struct CreateBannerRequest {
    #[serde(default)]
    pub title: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request body for `PUT /content/admin/banners/{id}`. Absent fields keep
/// their current values; an explicit `null` clears a nullable field.
#[derive(Debug, Deserialize)]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub link_url: Option<Option<String>>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /content/admin/offers`.
#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,
    pub price_from: Option<f64>,
    pub flight_ref: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    pub mode: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request body for `PUT /content/admin/offers/{id}`. Same partial-update
/// semantics as banners; `click_count` is never editable.
#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub subtitle: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_from: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub flight_ref: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tag: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub mode: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Distinguishes an absent field from an explicit `null`: absent stays
/// `None`, `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// `GET /content/banners`
///
/// Active banners in display order. No authentication.
pub async fn public_banners(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let banners = BannerRepo::list_active(&state.pool).await?;
    let items = banners
        .iter()
        .map(|b| {
            json!({
                "id": b.id,
                "title": b.title,
                "image_url": b.image_url,
                "link_url": b.link_url,
                "position": b.position,
            })
        })
        .collect();
    Ok(Json(items))
}

/// `GET /content/offers`
///
/// Active offer cards in display order. No authentication.
pub async fn public_offers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let offers = OfferRepo::list_active(&state.pool).await?;
    let items = offers
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "title": o.title,
                "subtitle": o.subtitle,
                "price_from": o.price_from,
                "flight_ref": o.flight_ref,
                "tag": o.tag,
                "description": o.description,
                "mode": o.mode,
                "position": o.position,
            })
        })
        .collect();
    Ok(Json(items))
}

/// `POST /content/offers/{id}/click`
///
/// Count a click on an active, interactive offer. Inactive and
/// informational offers report 404.
pub async fn offer_click(
    State(state): State<AppState>,
    Path(offer_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let count = OfferRepo::record_click(&state.pool, offer_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Offer", offer_id))?;
    Ok(Json(json!({ "status": "ok", "click_count": count })))
}

// ---------------------------------------------------------------------------
// Admin banner CRUD
// ---------------------------------------------------------------------------

/// `GET /content/admin/banners`
pub async fn list_banners(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let banners = BannerRepo::list_all(&state.pool).await?;
    let items = banners
        .iter()
        .map(|b| {
            json!({
                "id": b.id,
                "title": b.title,
                "image_url": b.image_url,
                "link_url": b.link_url,
                "position": b.position,
                "is_active": b.is_active,
            })
        })
        .collect();
    Ok(Json(items))
}

/// `POST /content/admin/banners`
pub async fn create_banner(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
    Json(req): Json<CreateBannerRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title required".into(),
        )));
    }
    let banner = BannerRepo::create(
        &state.pool,
        &NewBanner {
            title: title.to_string(),
            image_url: req.image_url,
            link_url: req.link_url,
            position: req.position,
            is_active: req.is_active,
        },
    )
    .await?;
    Ok(Json(json!({ "id": banner.id })))
}

/// `PUT /content/admin/banners/{id}`
pub async fn update_banner(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
    Path(banner_id): Path<DbId>,
    Json(req): Json<UpdateBannerRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let banner = BannerRepo::find_by_id(&state.pool, banner_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Banner", banner_id))?;
    let merged = NewBanner {
        title: req.title.unwrap_or(banner.title),
        image_url: req.image_url.unwrap_or(banner.image_url),
        link_url: req.link_url.unwrap_or(banner.link_url),
        position: req.position.unwrap_or(banner.position),
        is_active: req.is_active.unwrap_or(banner.is_active),
    };
    if !BannerRepo::update(&state.pool, banner_id, &merged).await? {
        return Err(AppError::Core(CoreError::not_found("Banner", banner_id)));
    }
    Ok(Json(json!({ "status": "ok" })))
}

/// `DELETE /content/admin/banners/{id}`
pub async fn delete_banner(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
    Path(banner_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !BannerRepo::delete(&state.pool, banner_id).await? {
        return Err(AppError::Core(CoreError::not_found("Banner", banner_id)));
    }
    Ok(Json(json!({ "status": "deleted" })))
}

// ---------------------------------------------------------------------------
// Admin offer CRUD
// ---------------------------------------------------------------------------

/// `GET /content/admin/offers`
pub async fn list_offers(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let offers = OfferRepo::list_all(&state.pool).await?;
    let items = offers
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "title": o.title,
                "subtitle": o.subtitle,
                "price_from": o.price_from,
                "flight_ref": o.flight_ref,
                "tag": o.tag,
                "description": o.description,
                "mode": o.mode,
                "click_count": o.click_count,
                "position": o.position,
                "is_active": o.is_active,
            })
        })
        .collect();
    Ok(Json(items))
}

/// `POST /content/admin/offers`
pub async fn create_offer(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
    Json(req): Json<CreateOfferRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title required".into(),
        )));
    }
    let mode = req.mode.unwrap_or_else(|| "interactive".to_string());
    validate_mode(&mode)?;
    let offer = OfferRepo::create(
        &state.pool,
        &NewOffer {
            title: title.to_string(),
            subtitle: req.subtitle,
            price_from: req.price_from,
            flight_ref: req.flight_ref,
            tag: req.tag,
            description: req.description,
            mode,
            position: req.position,
            is_active: req.is_active,
        },
    )
    .await?;
    Ok(Json(json!({ "id": offer.id })))
}

/// `PUT /content/admin/offers/{id}`
pub async fn update_offer(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
    Path(offer_id): Path<DbId>,
    Json(req): Json<UpdateOfferRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let offer = OfferRepo::find_by_id(&state.pool, offer_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Offer", offer_id))?;
    let mode = req.mode.unwrap_or(offer.mode);
    validate_mode(&mode)?;
    let merged = NewOffer {
        title: req.title.unwrap_or(offer.title),
        subtitle: req.subtitle.unwrap_or(offer.subtitle),
        price_from: req.price_from.unwrap_or(offer.price_from),
        flight_ref: req.flight_ref.unwrap_or(offer.flight_ref),
        tag: req.tag.unwrap_or(offer.tag),
        description: req.description.unwrap_or(offer.description),
        mode,
        position: req.position.unwrap_or(offer.position),
        is_active: req.is_active.unwrap_or(offer.is_active),
    };
    if !OfferRepo::update(&state.pool, offer_id, &merged).await? {
        return Err(AppError::Core(CoreError::not_found("Offer", offer_id)));
    }
    Ok(Json(json!({ "status": "ok" })))
}

/// `DELETE /content/admin/offers/{id}`
pub async fn delete_offer(
    State(state): State<AppState>,
    RequireContentManager(_admin): RequireContentManager,
    Path(offer_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !OfferRepo::delete(&state.pool, offer_id).await? {
        return Err(AppError::Core(CoreError::not_found("Offer", offer_id)));
    }
    Ok(Json(json!({ "status": "deleted" })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_mode(mode: &str) -> AppResult<()> {
    if OFFER_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(
            "mode must be interactive or info".into(),
        )))
    }
}
