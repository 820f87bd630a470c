//! Route definitions for the public `/flights` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::flights;
use crate::state::AppState;

/// Routes mounted at `/flights`.
///
/// ```text
/// GET /      -> search_flights
/// GET /{id}  -> flight_detail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(flights::search_flights))
        .route("/{id}", get(flights::flight_detail))
}
