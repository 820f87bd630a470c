//! Connection registry for the notification WebSocket.
//!
//! Keyed by connection id; a user with several tabs open holds several
//! entries. Outbound frames go through per-connection unbounded channels,
//! so fan-out never blocks on a slow client.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

/// Sender half used to push frames at one connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// State kept per live connection.
pub struct WsConnection {
    /// Owner of the connection (lowercased email). Upgrades are
    /// authenticated, so this is always present.
    pub user_email: String,
    pub sender: WsSender,
}

/// Registry of live WebSocket connections, shared behind an `Arc`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and hand back the receiver half that the
    /// socket task forwards to the sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_email: String,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(
            conn_id,
            WsConnection {
                user_email,
                sender: tx,
            },
        );
        rx
    }

    /// Drop a connection from the registry.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Push a frame at every live connection.
    ///
    /// A failed send means the receive loop already exited; that entry is
    /// removed when its socket task finishes.
    pub async fn broadcast(&self, message: Message) {
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Push a frame at every connection the user holds. Returns how many
    /// connections were addressed.
    pub async fn send_to_user(&self, user_email: &str, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for conn in conns.values().filter(|c| c.user_email == user_email) {
            let _ = conn.sender.send(message.clone());
            delivered += 1;
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Graceful-shutdown path: Close frame to everyone, then clear.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Ping every connection; the heartbeat task calls this on a timer.
    pub async fn ping_all(&self) {
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
