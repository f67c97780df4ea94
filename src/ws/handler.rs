//! WebSocket handler for relay clients.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};

use crate::api::AppState;

use super::hub::RelayHub;
use super::types::{
    ClientFrame, EVENT_DRIVER_LOCATION, EVENT_TRIP_END, EVENT_TRIP_START, ServerEvent, trip_status,
};

/// WebSocket upgrade handler.
///
/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_connection(socket, hub))
}

/// Drive a single relay connection until the client disconnects.
async fn handle_connection(socket: WebSocket, hub: Arc<RelayHub>) {
    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut event_rx) = hub.register();

    // Forward hub events to this client.
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    warn!("Failed to serialize event for {}: {}", conn_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Process incoming frames.
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => handle_frame(&hub, conn_id, frame),
                Err(e) => {
                    warn!("Malformed frame from {}: {}", conn_id, e);
                }
            },
            Ok(Message::Binary(_)) => {
                debug!("Ignoring binary message from {}", conn_id);
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!("Connection {} closed by client", conn_id);
                break;
            }
            Err(e) => {
                warn!("WebSocket error on {}: {}", conn_id, e);
                break;
            }
        }
    }

    send_task.abort();
    hub.unregister(conn_id);
}

/// Dispatch one client frame.
fn handle_frame(hub: &RelayHub, conn_id: super::hub::ConnectionId, frame: ClientFrame) {
    match frame.event.as_str() {
        EVENT_DRIVER_LOCATION => {
            let payload = frame.data.unwrap_or(serde_json::Value::Null);
            // The sender already knows its own position.
            hub.broadcast(ServerEvent::LocationUpdate(payload), Some(conn_id));
        }
        EVENT_TRIP_START => {
            hub.broadcast(
                ServerEvent::TripStatus(trip_status("started", frame.data)),
                None,
            );
        }
        EVENT_TRIP_END => {
            hub.broadcast(
                ServerEvent::TripStatus(trip_status("ended", frame.data)),
                None,
            );
        }
        other => {
            debug!("Ignoring unknown event '{}' from {}", other, conn_id);
        }
    }
}
