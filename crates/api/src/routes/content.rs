//! Route definitions for the `/content` resource.
//!
//! The listing and click endpoints are public; everything under `/admin`
//! requires content-management rights.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Routes mounted at `/content`.
///
/// ```text
/// GET    /banners                  -> public_banners
/// GET    /offers                   -> public_offers
/// POST   /offers/{id}/click        -> offer_click
///
/// GET    /admin/banners            -> list_banners
/// POST   /admin/banners            -> create_banner
/// PUT    /admin/banners/{id}       -> update_banner
/// DELETE /admin/banners/{id}       -> delete_banner
///
/// GET    /admin/offers             -> list_offers
/// POST   /admin/offers             -> create_offer
/// PUT    /admin/offers/{id}        -> update_offer
/// DELETE /admin/offers/{id}        -> delete_offer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Public landing-page endpoints.
        .route("/banners", get(content::public_banners))
        .route("/offers", get(content::public_offers))
        .route("/offers/{id}/click", post(content::offer_click))
        // Admin CRUD.
        .route(
            "/admin/banners",
            get(content::list_banners).post(content::create_banner),
        )
        .route(
            "/admin/banners/{id}",
            put(content::update_banner).delete(content::delete_banner),
        )
        .route(
            "/admin/offers",
            get(content::list_offers).post(content::create_offer),
        )
        .route(
            "/admin/offers/{id}",
            put(content::update_offer).delete(content::delete_offer),
        )
}
