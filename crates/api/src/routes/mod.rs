//! Route definitions, grouped per resource.

pub mod admin;
pub mod auth;
pub mod company;
pub mod content;
pub mod flights;
pub mod health;
pub mod notifications;
pub mod tickets;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                          notification WebSocket (?token=)
///
/// /auth/register                               register (public)
/// /auth/login                                  login (public)
///
/// /flights                                     search (public)
/// /flights/{id}                                detail (public)
///
/// /tickets                                     purchase (POST)
/// /tickets/my                                  own tickets, paginated (GET)
/// /tickets/{code}                              detail by confirmation code (GET)
/// /tickets/{code}/cancel                       cancel with refund window (POST)
/// /tickets/{code}/reminder                     set custom reminder (POST)
/// /tickets/{code}/reminder/{id}                delete custom reminder (DELETE)
///
/// /notifications                               list, newest first (GET)
/// /notifications/unread-count                  unread count (GET)
/// /notifications/mark-all-read                 mark all read (POST)
/// /notifications/{id}/read                     mark one read (POST)
///
/// /company/flights                             fleet list, create (GET, POST)
/// /company/flights/{id}                        edit, delete (PUT, DELETE)
/// /company/flights/{id}/seats-adjust           manual seat adjustment (POST)
/// /company/flights/{id}/passengers             paid-ticket manifest (GET)
/// /company/flights/{id}/passengers/export      CSV or SpreadsheetML download (GET)
/// /company/stats                               fleet statistics (GET)
/// /company/info                                visible companies (GET)
///
/// /admin/users                                 list users (GET)
/// /admin/users/{id}/block                      block account (POST)
/// /admin/users/{id}/unblock                    unblock account (POST)
/// /admin/companies                             list, create (GET, POST)
/// /admin/companies/{id}/assign-manager         link manager (POST)
/// /admin/companies/{id}/deactivate             deactivate company (POST)
/// /admin/stats                                 service-wide counters (GET)
///
/// /content/banners                             active banners (GET, public)
/// /content/offers                              active offers (GET, public)
/// /content/offers/{id}/click                   count a click (POST, public)
/// /content/admin/banners                       list, create (GET, POST)
/// /content/admin/banners/{id}                  update, delete (PUT, DELETE)
/// /content/admin/offers                        list, create (GET, POST)
/// /content/admin/offers/{id}                   update, delete (PUT, DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Real-time notification stream.
        .route("/ws", get(ws::ws_handler))
        // Registration and login (public).
        .nest("/auth", auth::router())
        // Public flight search.
        .nest("/flights", flights::router())
        // Ticket purchase, cancellation and reminders.
        .nest("/tickets", tickets::router())
        // Per-user notification inbox.
        .nest("/notifications", notifications::router())
        // Fleet management for company managers.
        .nest("/company", company::router())
        // User and company administration.
        .nest("/admin", admin::router())
        // Landing-page banners and offers.
        .nest("/content", content::router())
}
