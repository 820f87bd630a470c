//! WebSocket upgrade endpoint for the notification stream.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use skylane_core::error::CoreError;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Query parameters of the upgrade request.
///
/// Browsers cannot attach an `Authorization` header to a WebSocket
/// handshake, so the access token travels as `?token=`.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Verifies the token before the upgrade; without a valid token no socket
/// is opened. The connection is registered under the token's email, which
/// is the address notifications are delivered to.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let token = params.token.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Missing token query parameter".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Token is invalid or expired".into()))
    })?;

    Ok(ws.on_upgrade(move |socket| serve_connection(socket, state.ws_manager, claims.email)))
}

/// Drives one connection until either side hangs up.
///
/// The outbound half runs as its own task, pumping frames from the manager
/// channel into the sink. The inbound half runs here; the stream is
/// push-only, so anything beyond control frames is ignored.
async fn serve_connection(socket: WebSocket, ws_manager: Arc<WsManager>, user_email: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user = %user_email, "WebSocket connected");

    let mut outbound = ws_manager.add(conn_id.clone(), user_email).await;
    let (mut sink, mut stream) = socket.split();

    let pump_id = conn_id.clone();
    let pump = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sink.send(frame).await.is_err() {
                tracing::debug!(conn_id = %pump_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(inbound) = stream.next().await {
        match inbound {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => tracing::trace!(conn_id = %conn_id, "Pong received"),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    pump.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
