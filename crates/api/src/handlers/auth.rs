//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use skylane_core::error::CoreError;
use skylane_core::roles::Role;
use skylane_core::types::DbId;
use skylane_db::models::user::User;
use skylane_db::repositories::{CompanyRepo, UserRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    pub user: UserInfo,
}

/// Public user info returned by register and embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a new account with the default `user` role.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<UserInfo>> {
    // 1. Normalize and validate the input.
    let email = input.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid email address".into(),
        )));
    }

    let full_name = input.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "full_name required".into(),
        )));
    }

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    // 2. Reject duplicate emails with a readable message. A concurrent
    //    register still trips the unique constraint and maps to 409.
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".into(),
        )));
    }

    // 3. Hash the password and create the account.
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &email,
        full_name,
        &password_hash,
        Role::User.as_str(),
    )
    .await?;

    Ok(Json(UserInfo::from(&user)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns an access token whose claims
/// carry the role and, for managers, the managed company ids.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. Find user by email.
    let email = input.email.trim().to_lowercase();
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    // 2. Blocked accounts cannot log in. Tokens issued earlier remain valid
    //    until expiry; blocking takes effect at the next login.
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is blocked".into(),
        )));
    }

    // 3. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // 4. Managers get their company scope baked into the claims.
    let role = user.role();
    let company_ids = match role {
        Role::CompanyManager => CompanyRepo::manager_company_ids(&state.pool, user.id).await?,
        _ => vec![],
    };

    // 5. Generate the access token.
    let access_token = generate_access_token(
        user.id,
        &user.email,
        role.as_str(),
        company_ids,
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer",
        user: UserInfo::from(&user),
    }))
}
