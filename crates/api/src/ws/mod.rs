//! Real-time notification transport.
//!
//! The registry tracks live connections, the heartbeat keeps them alive,
//! and the handler authenticates and serves the upgrade endpoint.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
