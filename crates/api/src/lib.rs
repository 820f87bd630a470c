//! Skylane API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! WebSocket infrastructure, background scheduling) so integration tests and
//! the binary entrypoint share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
