//! Role gates for route handlers.
//!
//! Wrapping [`AuthUser`] in one of these extractors makes a route's
//! authorization requirement part of its signature. The role-to-capability
//! mapping lives in `skylane_core::roles`; this module only states which
//! capability a gate needs and what a refusal says.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use skylane_core::error::CoreError;
use skylane_core::roles::Capability;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    capability: Capability,
    refusal: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role.can(capability) {
        Ok(user)
    } else {
        Err(AppError::Core(CoreError::Forbidden(refusal.to_string())))
    }
}

/// Admin-only routes: user administration, company registry, service stats.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, Capability::ManageUsers, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Fleet routes: company managers and admins.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(
            parts,
            state,
            Capability::ManageFleet,
            "Company manager or admin role required",
        )
        .await
        .map(RequireManager)
    }
}

/// Landing-page content administration. Admin-only today.
pub struct RequireContentManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireContentManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, Capability::ManageContent, "Admin role required")
            .await
            .map(RequireContentManager)
    }
}
