//! Bearer-token authentication for HTTP handlers.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use skylane_core::error::CoreError;
use skylane_core::roles::Role;
use skylane_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Identity taken from a verified access token.
///
/// Built entirely from token claims, so no request touches the users table.
/// Consequences: blocking an account takes effect at the next login, and a
/// freshly assigned manager must log in again to pick up the company scope.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Lowercased email, used as the ticket owner key.
    pub email: String,
    pub role: Role,
    /// Managed company ids; empty unless the role is `company_manager`.
    pub company_ids: Vec<DbId>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Token is invalid or expired"))?;

        // An unknown role name means a token minted by someone else.
        let role = Role::from_str(&claims.role)
            .map_err(|_| unauthorized("Token is invalid or expired"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role,
            company_ids: claims.company_ids,
        })
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Authentication required"))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Authorization header must be: Bearer <token>"))
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}
