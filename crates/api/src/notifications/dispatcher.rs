//! Dispatcher implementations and wire payload builders.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;

use skylane_core::notify;
use skylane_core::types::DbId;
use skylane_db::models::notification::Notification;

use crate::ws::WsManager;

/// Pushes committed state changes to connected clients.
///
/// Implementations must be fire-and-forget: delivery problems are logged,
/// never surfaced to the caller, and a recipient without open connections
/// is not an error.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Push a persisted notification to its recipient's live connections.
    async fn deliver(&self, notification: &Notification);

    /// Broadcast a seat-availability change for a flight to all clients.
    async fn broadcast_seats(&self, flight_id: DbId, seats_available: i32);
}

/// Build the wire payload for a notification push.
pub fn notification_event(notification: &Notification) -> serde_json::Value {
    serde_json::json!({
        "type": notify::WS_TYPE_NOTIFICATION,
        "data": notification,
    })
}

/// Build the wire payload for a seat-availability broadcast.
pub fn seats_event(flight_id: DbId, seats_available: i32) -> serde_json::Value {
    serde_json::json!({
        "type": notify::WS_TYPE_FLIGHT_SEATS,
        "data": {
            "flight_id": flight_id,
            "seats_available": seats_available,
        },
    })
}

/// Production dispatcher backed by the [`WsManager`].
pub struct WsDispatcher {
    ws_manager: Arc<WsManager>,
}

impl WsDispatcher {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }
}

#[async_trait]
impl NotificationDispatcher for WsDispatcher {
    async fn deliver(&self, notification: &Notification) {
        let payload = notification_event(notification);
        let sent = self
            .ws_manager
            .send_to_user(
                &notification.user_email,
                Message::Text(payload.to_string().into()),
            )
            .await;
        tracing::debug!(
            user = %notification.user_email,
            kind = %notification.kind,
            sent,
            "Notification dispatched"
        );
    }

    async fn broadcast_seats(&self, flight_id: DbId, seats_available: i32) {
        let payload = seats_event(flight_id, seats_available);
        self.ws_manager
            .broadcast(Message::Text(payload.to_string().into()))
            .await;
    }
}

/// Dispatcher that drops everything. Used by tests that exercise HTTP
/// behavior without a WebSocket layer.
pub struct NoopDispatcher;

#[async_trait]
impl NotificationDispatcher for NoopDispatcher {
    async fn deliver(&self, _notification: &Notification) {}

    async fn broadcast_seats(&self, _flight_id: DbId, _seats_available: i32) {}
}
