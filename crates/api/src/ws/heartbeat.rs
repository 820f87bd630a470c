use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns the ping loop for the WebSocket registry.
///
/// Intermediate proxies drop idle WebSocket connections; a Ping every 30
/// seconds keeps them open, and dead clients surface as failed sends. Runs
/// until the returned handle is aborted at shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            tick.tick().await;
            let count = ws_manager.connection_count().await;
            if count == 0 {
                continue;
            }
            ws_manager.ping_all().await;
            tracing::debug!(count, "WebSocket heartbeat ping");
        }
    })
}
