//! Route definitions for the `/admin` resource.
//!
//! All endpoints require the `admin` role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /users                           -> list_users
/// POST /users/{id}/block                -> block_user
/// POST /users/{id}/unblock              -> unblock_user
/// GET  /companies                       -> list_companies
/// POST /companies                       -> create_company
/// POST /companies/{id}/assign-manager   -> assign_manager
/// POST /companies/{id}/deactivate       -> deactivate_company
/// GET  /stats                           -> service_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/block", post(admin::block_user))
        .route("/users/{id}/unblock", post(admin::unblock_user))
        .route(
            "/companies",
            get(admin::list_companies).post(admin::create_company),
        )
        .route(
            "/companies/{id}/assign-manager",
            post(admin::assign_manager),
        )
        .route("/companies/{id}/deactivate", post(admin::deactivate_company))
        .route("/stats", get(admin::service_stats))
}
