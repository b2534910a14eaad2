//! WebSocket gateway for the real-time threat feed.
//!
//! ## Protocol
//!
//! Clients connect to `/ws` and receive JSON envelopes:
//!
//! - `welcome` - once, right after connecting
//! - `threatUpdate` - one snapshot per simulation tick
//! - `ack` - reply to every inbound frame
//!
//! Clients report the operator position with
//! `{"event": "systemUpdate", "data": {"lat": .., "lng": ..}}`.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use threat_simulator::SharedEngine;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::context::AppState;
use crate::protocol::{self, ServerMessage};

/// Pending acknowledgements per connection
const REPLY_CAPACITY: usize = 16;

/// WebSocket upgrade handler
#[tracing::instrument(skip(state, ws))]
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    tracing::info!(%client_id, observers = state.observer_count() + 1, "Client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(REPLY_CAPACITY);

    // Forward welcome, snapshots and acks to the client
    let forward_task = tokio::spawn(async move {
        if send_message(&mut sender, &ServerMessage::welcome()).await.is_err() {
            return;
        }

        loop {
            let message = tokio::select! {
                result = updates.recv() => match result {
                    Ok(snapshot) => ServerMessage::ThreatUpdate(snapshot),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%client_id, skipped, "Observer lagged, snapshots dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
            };

            if send_message(&mut sender, &message).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                let ack = handle_client_text(text.as_str(), &state.engine).await;
                if reply_tx.send(ack).await.is_err() {
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!(%client_id, "Ignoring binary WebSocket message");
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
        }
    }

    forward_task.abort();
    tracing::info!(%client_id, "Client disconnected");
}

/// Apply an inbound frame to the engine and build the acknowledgement.
///
/// Rejected frames leave the last known good reference position in place.
pub async fn handle_client_text(text: &str, engine: &SharedEngine) -> ServerMessage {
    match protocol::parse_position_update(text) {
        Ok(position) => {
            engine.lock().await.update_reference(position);
            ServerMessage::received()
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                code = err.error_code(),
                "Rejected reference-position update"
            );
            ServerMessage::rejected(&err)
        }
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize outbound message");
            Ok(())
        }
    }
}
