//! Domain-level error type shared by all crates.

/// Errors produced by domain logic, independent of HTTP or the database.
///
/// The API layer maps each variant onto an HTTP status code; see
/// `skylane-api`'s `AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup failed. `id` is rendered as text so string keys
    /// (confirmation codes) and numeric ids share one variant.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The request was well-formed but a value is out of range or malformed.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with the current state of the resource
    /// (insufficient seats, past-flight edit, departed-flight cancel, ...).
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid credentials, but the caller is not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// The caller is submitting too quickly and should back off.
    #[error("{0}")]
    RateLimited(String),

    /// Anything we cannot attribute to the caller.
    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
