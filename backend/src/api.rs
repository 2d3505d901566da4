//! HTTP surface: room minting, matchmaking, and the websocket channel.
//!
//! The websocket endpoint is the transport for the whole protocol: each
//! connection sends JSON [`ClientMessage`] frames and receives JSON
//! [`ServerEvent`] frames. The first `join` on a connection attaches it to
//! a room (creating the room on first reference); everything after that is
//! forwarded onto the room's command queue. Closing the socket, cleanly or
//! not, runs the room's disconnect policy.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, trace};
use uuid::Uuid;

use shared::protocol::ClientMessage;

use crate::registry::RoomRegistry;
use crate::room::{Connection, RoomCommand, RoomHandle};

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            rooms: RoomRegistry::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct RoomResponse {
    pub room_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/random", get(join_random))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Mints a fresh room id. The room itself spins up when the first watcher
/// joins over the websocket.
async fn create_room(State(state): State<AppState>) -> Json<RoomResponse> {
    Json(RoomResponse {
        room_id: state.rooms.mint_id(),
    })
}

/// Matchmaking: points the caller at the most joinable existing room, or
/// a fresh id when every room is full or empty.
async fn join_random(State(state): State<AppState>) -> Json<RoomResponse> {
    let room_id = state
        .rooms
        .find_open_room()
        .unwrap_or_else(|| state.rooms.mint_id());
    Json(RoomResponse { room_id })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection(socket, state))
}

async fn connection(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();
    let (event_tx, mut event_rx) = unbounded_channel();

    // pump room events out to the socket; the room never waits on a slow
    // client, events just queue here
    let writer = tokio::spawn(async move {
        while let Some(ev) = event_rx.recv().await {
            let Ok(json) = serde_json::to_string(&ev) else {
                continue;
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut joined: Option<RoomHandle> = None;

    while let Some(Ok(msg)) = stream.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let action = match serde_json::from_str::<ClientMessage>(text.as_str()) {
            Ok(action) => action,
            Err(err) => {
                // malformed frames are rejected actions: dropped, no reply
                trace!(conn = %conn_id, %err, "unparseable frame");
                continue;
            }
        };

        match (&joined, action) {
            (None, ClientMessage::Join { room }) => {
                let handle = state.rooms.get_or_create(&room);
                let conn = Connection {
                    id: conn_id,
                    tx: event_tx.clone(),
                };
                if handle.tx.send(RoomCommand::Join { conn }).is_ok() {
                    debug!(conn = %conn_id, room = %room, "connection joined room");
                    joined = Some(handle);
                }
            }
            // a connection attaches to one room for its lifetime
            (Some(_), ClientMessage::Join { .. }) => {}
            (Some(handle), ClientMessage::ChooseSide { side }) => {
                let _ = handle.tx.send(RoomCommand::ChooseSide { conn_id, side });
            }
            (Some(handle), ClientMessage::Ready) => {
                let _ = handle.tx.send(RoomCommand::Ready { conn_id });
            }
            (Some(handle), ClientMessage::MoveRequest { piece, to }) => {
                let _ = handle.tx.send(RoomCommand::MoveRequest {
                    conn_id,
                    piece,
                    to,
                });
            }
            (_, ClientMessage::Leave) => break,
            // actions before joining a room are dropped
            (None, _) => {}
        }
    }

    if let Some(handle) = joined {
        let _ = handle.tx.send(RoomCommand::Leave { conn_id });
    }
    writer.abort();
    debug!(conn = %conn_id, "connection closed");
}
