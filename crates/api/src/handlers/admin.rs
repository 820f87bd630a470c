//! Handlers for the `/admin` resource: user and company administration plus
//! service-wide statistics.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use skylane_core::error::CoreError;
use skylane_core::roles::{Capability, Role};
use skylane_core::types::DbId;
use skylane_db::models::stats::ServiceStats;
use skylane_db::repositories::{CompanyRepo, StatsRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::stats_time_range;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /admin/companies`.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    #[serde(default)]
    pub name: String,
}

/// Request body for `POST /admin/companies/{id}/assign-manager`.
#[derive(Debug, Deserialize)]
pub struct AssignManagerRequest {
    pub user_id: DbId,
}

/// Query parameters for `GET /admin/stats`.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub range: Option<String>,
}

/// `GET /admin/users`
///
/// Every registered account, oldest first.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let users = UserRepo::list(&state.pool).await?;
    let items = users
        .iter()
        .map(|u| {
            json!({
                "id": u.id,
                "email": u.email,
                "full_name": u.full_name,
                "role": u.role,
                "is_active": u.is_active,
            })
        })
        .collect();
    Ok(Json(items))
}

/// `POST /admin/users/{id}/block`
///
/// Deactivate an account. Takes effect at the next login; tokens issued
/// earlier keep working until they expire.
pub async fn block_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !UserRepo::set_active(&state.pool, user_id, false).await? {
        return Err(AppError::Core(CoreError::not_found("User", user_id)));
    }
    tracing::info!(user_id, "User blocked");
    Ok(Json(json!({ "status": "ok" })))
}

/// `POST /admin/users/{id}/unblock`
pub async fn unblock_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !UserRepo::set_active(&state.pool, user_id, true).await? {
        return Err(AppError::Core(CoreError::not_found("User", user_id)));
    }
    tracing::info!(user_id, "User unblocked");
    Ok(Json(json!({ "status": "ok" })))
}

/// `GET /admin/companies`
pub async fn list_companies(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let companies = CompanyRepo::list(&state.pool).await?;
    let items = companies
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "is_active": c.is_active,
            })
        })
        .collect();
    Ok(Json(items))
}

/// `POST /admin/companies`
///
/// Create a company. A duplicate name maps to 409 through the unique
/// constraint on `companies.name`.
pub async fn create_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CreateCompanyRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation("name required".into())));
    }
    let company = CompanyRepo::create(&state.pool, name).await?;
    tracing::info!(company_id = company.id, "Company created");
    Ok(Json(json!({ "id": company.id })))
}

/// `POST /admin/companies/{id}/assign-manager`
///
/// Link a user to a company as its manager. Plain users are promoted to
/// `company_manager`; admins keep their role. The new scope lands in the
/// user's token at their next login.
pub async fn assign_manager(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(company_id): Path<DbId>,
    Json(req): Json<AssignManagerRequest>,
) -> AppResult<Json<serde_json::Value>> {
    CompanyRepo::find_by_id(&state.pool, company_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Company", company_id))?;
    let user = UserRepo::find_by_id(&state.pool, req.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", req.user_id))?;

    CompanyRepo::assign_manager(&state.pool, user.id, company_id).await?;
    if user.role == Role::User.as_str() {
        UserRepo::set_role(&state.pool, user.id, Role::CompanyManager.as_str()).await?;
    }
    tracing::info!(user_id = user.id, company_id, "Manager assigned");
    Ok(Json(json!({ "status": "ok" })))
}

/// `POST /admin/companies/{id}/deactivate`
pub async fn deactivate_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(company_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !CompanyRepo::set_active(&state.pool, company_id, false).await? {
        return Err(AppError::Core(CoreError::not_found("Company", company_id)));
    }
    tracing::info!(company_id, "Company deactivated");
    Ok(Json(json!({ "status": "ok" })))
}

/// `GET /admin/stats`
///
/// Service-wide counters over an optional time range. Flights are filtered
/// by departure, ticket counts and sales by purchase time.
pub async fn service_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<ServiceStats>> {
    if !user.role.can(Capability::ViewServiceStats) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin role required".into(),
        )));
    }
    let (start, end) = stats_time_range(params.range.as_deref());
    let stats = StatsRepo::service_stats(&state.pool, start, end).await?;
    Ok(Json(stats))
}
