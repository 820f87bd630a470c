//! Route definitions for the `/company` fleet resource.
//!
//! Every endpoint requires the `company_manager` or `admin` role; the
//! handlers narrow further (ownership checks, manager-only create).

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::company;
use crate::state::AppState;

/// Routes mounted at `/company`.
///
/// ```text
/// GET    /flights                          -> list_fleet
/// POST   /flights                          -> create_flight
/// PUT    /flights/{id}                     -> update_flight
/// DELETE /flights/{id}                     -> delete_flight
/// POST   /flights/{id}/seats-adjust        -> adjust_seats
/// GET    /flights/{id}/passengers          -> list_passengers
/// GET    /flights/{id}/passengers/export   -> export_passengers
/// GET    /stats                            -> fleet_stats
/// GET    /info                             -> company_info
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/flights",
            get(company::list_fleet).post(company::create_flight),
        )
        .route(
            "/flights/{id}",
            put(company::update_flight).delete(company::delete_flight),
        )
        .route("/flights/{id}/seats-adjust", post(company::adjust_seats))
        .route("/flights/{id}/passengers", get(company::list_passengers))
        .route(
            "/flights/{id}/passengers/export",
            get(company::export_passengers),
        )
        .route("/stats", get(company::fleet_stats))
        .route("/info", get(company::company_info))
}
