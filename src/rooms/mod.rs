//! HTTP surface for rooms and message history, plus the WebSocket route.

mod ws;

use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::{
    AppResult, AppState,
    error::RelayError,
    protocol::SendMessage,
    relay::MessageRelay,
    store::{Message, Room, Store},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}/messages", get(list_messages).post(post_message))
        .route("/ws", get(ws::room_ws))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRoomRequest {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostMessageRequest {
    message: String,
    user: String,
}

#[debug_handler]
async fn create_room(
    State(store): State<Store>,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(RelayError::validation("room name is required"));
    }

    let room = store.insert_room(&req.name, &req.description).await?;
    info!(room = %room.id, name = %room.name, "room created");
    Ok((StatusCode::CREATED, Json(room)))
}

#[debug_handler]
async fn list_rooms(State(store): State<Store>) -> AppResult<Json<Vec<Room>>> {
    Ok(Json(store.list_rooms().await?))
}

#[debug_handler]
async fn list_messages(
    State(store): State<Store>,
    Path(room_id): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(store.list_messages(&room_id).await?))
}

/// Persist-only publish: no broadcast to live connections.
#[debug_handler]
async fn post_message(
    State(relay): State<Arc<MessageRelay>>,
    Path(room_id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let message = relay
        .post(&SendMessage {
            room_id,
            author: req.user,
            body: req.message,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let state = AppState::new(pool);
        state.store.migrate().await.unwrap();
        state
    }

    #[tokio::test]
    async fn create_room_returns_created() {
        let state = state().await;
        let res = create_room(
            State(state.store.clone()),
            Json(CreateRoomRequest {
                name: "general".to_owned(),
                description: "x".to_owned(),
            }),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(res.status(), StatusCode::CREATED);
        let rooms = state.store.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "general");
    }

    #[tokio::test]
    async fn create_room_requires_a_name() {
        let state = state().await;
        let result = create_room(
            State(state.store.clone()),
            Json(CreateRoomRequest {
                name: "  ".to_owned(),
                description: String::new(),
            }),
        )
        .await;

        assert!(matches!(result, Err(RelayError::Validation(_))));
        assert!(state.store.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_message_persists_and_lists() {
        let state = state().await;
        let res = post_message(
            State(state.relay.clone()),
            Path("general".to_owned()),
            Json(PostMessageRequest {
                message: "hi".to_owned(),
                user: "alice".to_owned(),
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(res.status(), StatusCode::CREATED);

        let Json(messages) =
            list_messages(State(state.store.clone()), Path("general".to_owned()))
                .await
                .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].author, "alice");
        assert_eq!(messages[0].body, "hi");
    }

    #[tokio::test]
    async fn post_message_rejects_empty_body() {
        let state = state().await;
        let result = post_message(
            State(state.relay.clone()),
            Path("general".to_owned()),
            Json(PostMessageRequest {
                message: String::new(),
                user: "alice".to_owned(),
            }),
        )
        .await;
        assert!(matches!(result, Err(RelayError::Validation(_))));
    }

    #[tokio::test]
    async fn list_rooms_starts_empty() {
        let state = state().await;
        let Json(rooms) = list_rooms(State(state.store.clone())).await.unwrap();
        assert!(rooms.is_empty());
    }
}
