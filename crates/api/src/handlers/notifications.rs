//! Handlers for the `/notifications` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use skylane_core::error::CoreError;
use skylane_core::types::DbId;
use skylane_db::models::notification::Notification;
use skylane_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Default and maximum number of notifications returned by the feed.
const DEFAULT_LIMIT: i64 = 200;
const MAX_LIMIT: i64 = 200;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/notifications
///
/// The caller's notification feed, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let notifications = NotificationRepo::list_for_user(&state.pool, &auth.email, limit).await?;
    Ok(Json(notifications))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let unread = NotificationRepo::unread_count(&state.pool, &auth.email).await?;
    Ok(Json(json!({ "unread": unread })))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark one notification read. Marking an already-read notification is a
/// no-op success; a notification that is not the caller's is a 404.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let updated = NotificationRepo::mark_read(&state.pool, id, &auth.email).await?;
    if !updated {
        // Nothing flipped: either the row is already read (fine) or it does
        // not belong to the caller (404).
        NotificationRepo::find_for_user(&state.pool, id, &auth.email)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("Notification", id)))?;
    }
    Ok(Json(json!({ "status": "ok" })))
}

/// POST /api/v1/notifications/mark-all-read
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    NotificationRepo::mark_all_read(&state.pool, &auth.email).await?;
    Ok(Json(json!({ "status": "ok" })))
}
