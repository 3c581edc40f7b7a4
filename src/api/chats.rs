//! Users, chats, streaming and vote endpoints

use crate::api::chats::schemas::{
    ChatDetail, ChatList, ChatSummary, CreateChat, CreatedChat, CreatedUser, Pagination,
    SendMessage, SubmitVote, VoteResponse,
};
use crate::api::{channel, parse_id};
use crate::core::error::ArenaError;
use crate::core::traits::ArenaService;
use crate::infrastructure::entities::ChatMode;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

pub fn router() -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id/chats", get(list_user_chats))
        .route("/chats", post(create_chat))
        .route("/chats/:id", get(chat_history))
        .route("/chats/:id/messages/stream", post(stream_message))
        .route("/turns/:id/vote", post(submit_vote))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ArenaError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ArenaError::invalid_argument(rejection.body_text()))
}

async fn create_user(
    Inject(arena_service): Inject<dyn ArenaService>,
) -> (StatusCode, Json<CreatedUser>) {
    let user = arena_service.create_user().await;

    (StatusCode::CREATED, Json(CreatedUser { id: user.id }))
}

async fn list_user_chats(
    Inject(arena_service): Inject<dyn ArenaService>,
    Path(user_id): Path<String>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<ChatList>, ArenaError> {
    let user_id = parse_id(&user_id, "User")?;
    let Query(pagination) =
        pagination.map_err(|rejection| ArenaError::invalid_argument(rejection.body_text()))?;

    let limit = pagination
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE) as usize;
    let offset = pagination.offset.unwrap_or(0).max(0) as usize;

    let chats = arena_service
        .list_user_chats(user_id, limit, offset)
        .await;

    Ok(Json(ChatList {
        chats: chats.into_iter().map(ChatSummary::from).collect(),
    }))
}

async fn create_chat(
    Inject(arena_service): Inject<dyn ArenaService>,
    payload: Result<Json<CreateChat>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedChat>), ArenaError> {
    let request = json_body(payload)?;

    let user_id = match request.user_id.as_deref().map(str::trim) {
        None | Some("") => return Err(ArenaError::invalid_argument("user_id is required")),
        Some(raw) => Uuid::parse_str(raw)
            .map_err(|_| ArenaError::invalid_argument("user_id must be a valid id"))?,
    };
    let mode = match request.mode.as_deref() {
        None => ChatMode::Battle,
        Some(raw) => raw.parse::<ChatMode>().map_err(ArenaError::invalid_argument)?,
    };

    let (chat, turn) = arena_service.create_chat(user_id, mode).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedChat {
            id: chat.id,
            mode: chat.mode,
            name: chat.name,
            status: chat.status,
            turn_id: turn.id,
        }),
    ))
}

async fn chat_history(
    Inject(arena_service): Inject<dyn ArenaService>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDetail>, ArenaError> {
    let chat_id = parse_id(&chat_id, "Chat")?;
    let history = arena_service.chat_history(chat_id).await?;

    Ok(Json(ChatDetail::from(history)))
}

async fn stream_message(
    Inject(arena_service): Inject<dyn ArenaService>,
    Path(chat_id): Path<String>,
    payload: Result<Json<SendMessage>, JsonRejection>,
) -> Result<impl IntoResponse, ArenaError> {
    let request = json_body(payload)?;
    let content = request.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(ArenaError::invalid_argument("content is required"));
    }
    let chat_id = parse_id(&chat_id, "Chat")?;

    let turn = arena_service.open_turn(chat_id, &content).await?;
    debug!("opening event channel for turn {}", turn.id);

    let events = arena_service.stream_turn(turn.id, content);

    Ok(([("x-accel-buffering", "no")], channel::open(events)))
}

async fn submit_vote(
    Inject(arena_service): Inject<dyn ArenaService>,
    Path(turn_id): Path<String>,
    payload: Result<Json<SubmitVote>, JsonRejection>,
) -> Result<(StatusCode, Json<VoteResponse>), ArenaError> {
    let turn_id = parse_id(&turn_id, "Turn")?;
    let request = json_body(payload)?;

    let outcome = arena_service
        .submit_vote(turn_id, request.winner.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(VoteResponse::from(outcome))))
}

pub mod schemas {
    use crate::core::events::Fragment;
    use crate::core::traits::{ChatHistory, TurnHistory, VoteOutcome};
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::{
        ChatMode, ChatStatus, ModelInfo, ModelSlot, Role, TurnStatus, Vote,
    };
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    pub struct CreatedUser {
        pub id: Uuid,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Pagination {
        pub limit: Option<i64>,
        pub offset: Option<i64>,
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateChat {
        pub user_id: Option<String>,
        pub mode: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct CreatedChat {
        pub id: Uuid,
        pub mode: ChatMode,
        pub name: String,
        pub status: ChatStatus,
        pub turn_id: Uuid,
    }

    #[derive(Serialize, Debug)]
    pub struct ChatSummary {
        pub id: Uuid,
        pub mode: ChatMode,
        pub status: ChatStatus,
        pub name: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<entities::Chat> for ChatSummary {
        fn from(chat: entities::Chat) -> Self {
            ChatSummary {
                id: chat.id,
                mode: chat.mode,
                status: chat.status,
                name: chat.name,
                created_at: chat.created_at,
                updated_at: chat.updated_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ChatList {
        pub chats: Vec<ChatSummary>,
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub id: Uuid,
        pub role: Role,
        pub content: String,
        pub model_id: Option<String>,
        pub sequence_number: u32,
        pub response_time_ms: Option<u32>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                role: message.role,
                content: message.content,
                model_id: message.model_id,
                sequence_number: message.sequence_number,
                response_time_ms: message.response_time_ms,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Turn {
        pub id: Uuid,
        pub turn_number: u32,
        pub status: TurnStatus,
        pub vote: Option<Vote>,
        pub model_a: Option<ModelInfo>,
        pub model_b: Option<ModelInfo>,
        pub messages: Vec<Message>,
    }

    impl From<TurnHistory> for Turn {
        fn from(history: TurnHistory) -> Self {
            let verdict = history.turn.verdict().cloned();
            Turn {
                id: history.turn.id,
                turn_number: history.turn.turn_number,
                status: history.turn.status(),
                vote: verdict.as_ref().map(|v| v.vote),
                model_a: verdict.as_ref().map(|v| v.model_a.clone()),
                model_b: verdict.map(|v| v.model_b),
                messages: history.messages.into_iter().map(Message::from).collect(),
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ChatDetail {
        pub id: Uuid,
        pub mode: ChatMode,
        pub name: String,
        pub status: ChatStatus,
        pub current_turn_id: Uuid,
        pub turns: Vec<Turn>,
    }

    impl From<ChatHistory> for ChatDetail {
        fn from(history: ChatHistory) -> Self {
            ChatDetail {
                id: history.chat.id,
                mode: history.chat.mode,
                name: history.chat.name,
                status: history.chat.status,
                current_turn_id: history.chat.current_turn_id,
                turns: history.turns.into_iter().map(Turn::from).collect(),
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct SendMessage {
        pub content: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SubmitVote {
        pub winner: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct RevealedModels {
        pub model_a: ModelInfo,
        pub model_b: ModelInfo,
    }

    #[derive(Serialize, Debug)]
    pub struct VoteResponse {
        pub id: Uuid,
        pub revealed_models: RevealedModels,
        pub new_turn_id: Uuid,
        pub category: String,
        pub tags: Vec<String>,
    }

    impl From<VoteOutcome> for VoteResponse {
        fn from(outcome: VoteOutcome) -> Self {
            VoteResponse {
                id: outcome.turn_id,
                revealed_models: RevealedModels {
                    model_a: outcome.model_a,
                    model_b: outcome.model_b,
                },
                new_turn_id: outcome.new_turn_id,
                category: outcome.category,
                tags: outcome.tags,
            }
        }
    }

    /// Payload of a `chunk` event.
    #[derive(Serialize, Debug)]
    pub struct ChunkPayload {
        pub model_id: ModelSlot,
        pub content: String,
        pub sequence: u32,
    }

    impl From<&Fragment> for ChunkPayload {
        fn from(fragment: &Fragment) -> Self {
            ChunkPayload {
                model_id: fragment.model_id,
                content: fragment.content.clone(),
                sequence: fragment.sequence,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct DonePayload {
        pub turn_id: Uuid,
        pub status: TurnStatus,
    }

    #[derive(Serialize, Debug)]
    pub struct ErrorPayload {
        pub error: String,
        pub reason: String,
    }
}
