//! HTTP error mapping.
//!
//! Handlers return [`AppResult`]; every failure funnels through [`AppError`]
//! and comes out as a JSON body of the form `{"error": ..., "code": ...}`.
//! Domain failures originate in `skylane_core` and keep their message
//! verbatim; database and panic-level failures are sanitized before they
//! reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use skylane_core::error::CoreError;

/// Error type returned by every HTTP handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain failure bubbled up from the core or db layers.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Driver-level database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request that never reached the domain layer.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else. The message is logged, not sent to the client.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Stable machine-readable codes carried in the error body.
mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL: &str = "INTERNAL_ERROR";
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => db_parts(err),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, codes::BAD_REQUEST, msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::INTERNAL,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            format!("{entity} {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, codes::VALIDATION, msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, codes::CONFLICT, msg.clone()),
        CoreError::Unauthorized(msg) => {
            (StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, msg.clone())
        }
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, codes::FORBIDDEN, msg.clone()),
        CoreError::RateLimited(msg) => {
            (StatusCode::TOO_MANY_REQUESTS, codes::RATE_LIMITED, msg.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Core-layer internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL,
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

/// Maps driver errors to responses without leaking SQL details.
///
/// Unique-constraint violations on `uq_`-prefixed constraints (duplicate
/// email, duplicate company name) surface as 409 CONFLICT.
fn db_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        // 23505 is Postgres unique_violation.
        if db_err.code().as_deref() == Some("23505") {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return (
                    StatusCode::CONFLICT,
                    codes::CONFLICT,
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        codes::INTERNAL,
        INTERNAL_MESSAGE.to_string(),
    )
}
