use std::sync::Arc;

use skylane_core::throttle::ThrottleStore;

use crate::config::ServerConfig;
use crate::notifications::NotificationDispatcher;
use crate::ws::WsManager;

/// Everything a handler can reach through `State<AppState>`.
///
/// Cloned per request, so each field is either an `Arc` or itself cheap to
/// clone (the sqlx pool is an `Arc` internally).
#[derive(Clone)]
pub struct AppState {
    pub pool: skylane_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Live WebSocket connections for real-time pushes.
    pub ws_manager: Arc<WsManager>,
    /// Purchase throttle, keyed by user and flight.
    pub throttle: Arc<dyn ThrottleStore>,
    /// Notification fan-out seam; a no-op implementation in most tests.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}
