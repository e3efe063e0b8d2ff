//! Per-order WebSocket status stream.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{sink::SinkExt, stream::StreamExt};
use tracing::{error, info};
use uuid::Uuid;

use super::state::AppState;
use crate::domain::OrderStatus;
use crate::notify::StatusMessage;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, order_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, order_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.hub.register(order_id);

    // Snapshot first so the client never misses the starting state
    let initial = StatusMessage::status_update(order_id, OrderStatus::Pending, None);
    match serde_json::to_string(&initial) {
        Ok(json) => {
            if sender.send(Message::Text(json)).await.is_err() {
                state.hub.unregister(order_id);
                return;
            }
        }
        Err(e) => error!(%order_id, error = %e, "failed to serialize initial status"),
    }

    // Forward hub messages to this socket
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!(%order_id, error = %e, "failed to serialize status message");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Drain the client side until it closes
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Ping(_) | Message::Pong(_) => {
                // Axum handles ping/pong automatically
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    state.hub.unregister(order_id);

    info!(%order_id, "websocket connection closed");
}
