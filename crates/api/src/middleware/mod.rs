//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireManager`] -- Requires `company_manager` or `admin` role.
//! - [`rbac::RequireContentManager`] -- Requires content-management rights.

pub mod auth;
pub mod rbac;
