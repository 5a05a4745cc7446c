//! WebSocket transport: one socket per client, events routed to the
//! session and the relay.

use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{AppState, protocol::{ClientEvent, ServerEvent}, session::ConnSession};

#[debug_handler]
pub async fn room_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = ConnSession::new(state.registry.clone(), tx);
    let conn = session.id();
    info!(conn = %conn, "client connected");

    // Writer task owns the socket sink; the relay only ever touches the
    // channel, so a slow client cannot stall a broadcast.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(error = %err, "dropping unserializable event");
                    continue;
                }
            };
            if sink.send(WsMessage::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_event(&state, &mut session, event).await,
                Err(err) => session.notify(ServerEvent::Error {
                    message: format!("invalid request: {err}"),
                }),
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(conn = %conn, error = %err, "websocket error");
                break;
            }
        }
    }

    // Runs on every exit path, graceful close or abrupt drop.
    session.close().await;
    writer.abort();
    info!(conn = %conn, "client disconnected");
}

async fn handle_event(state: &AppState, session: &mut ConnSession, event: ClientEvent) {
    match event {
        ClientEvent::JoinRoom { room_id } => session.join_room(&room_id).await,
        ClientEvent::LeaveRoom { room_id } => session.leave_room(&room_id).await,
        ClientEvent::SendMessage(req) => {
            if let Err(err) = state.relay.publish(&req).await {
                warn!(conn = %session.id(), error = %err, "publish failed");
                session.notify(ServerEvent::Error {
                    message: err.to_string(),
                });
            }
        }
    }
}
