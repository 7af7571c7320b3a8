//! The bidirectional channel: `/ws/{room_id}/{player_id}`.
//!
//! On connect the server emits a full GAME_STATE_UPDATE snapshot to the new
//! channel and, mid-stage, a STAGE_CHANGE with the residual countdown.
//! Frames are ordered per connection; outbound delivery runs on a dedicated
//! writer task fed by the registry's mpsc channel.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::protocol::ServerEvent;
use crate::server::GameServer;

const OUTBOUND_QUEUE_CAPACITY: usize = 64;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path((room_id, player_id)): Path<(Uuid, Uuid)>,
    State(server): State<Arc<GameServer>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, server, room_id, player_id))
}

async fn handle_socket(socket: WebSocket, server: Arc<GameServer>, room_id: Uuid, player_id: Uuid) {
    let Some(coordinator) = server.room(room_id) else {
        debug!(%room_id, %player_id, "Channel rejected: room not found");
        return;
    };
    if !server.is_member(room_id, player_id).await {
        debug!(%room_id, %player_id, "Channel rejected: not a member");
        return;
    }

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<ServerEvent>>(OUTBOUND_QUEUE_CAPACITY);
    server.registry().connect(room_id, player_id, tx);
    info!(%room_id, %player_id, "Channel opened");

    // Writer task: serializes queued events onto the socket.
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(event.as_ref()) {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "Failed to serialize outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Fresh-connection snapshot (full state + residual stage timer).
    if let Err(err) = coordinator.on_connect(player_id).await {
        warn!(%room_id, %player_id, error = %err, "Connect snapshot failed");
    }

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                server
                    .dispatcher()
                    .handle_text(&coordinator, player_id, text.as_str())
                    .await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong frames carry no game meaning
            Err(err) => {
                debug!(%room_id, %player_id, error = %err, "Channel read error");
                break;
            }
        }
    }

    server.registry().disconnect(room_id, player_id);
    coordinator.on_disconnect(player_id).await;
    send_task.abort();
    info!(%room_id, %player_id, "Channel closed");
}
