//! DI "Interfaces"

use crate::core::error::ArenaError;
use crate::core::events::{Fragment, TurnEvent};
use crate::infrastructure::entities;
use crate::infrastructure::entities::{ChatMode, ModelInfo};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TurnHistory {
    pub turn: entities::Turn,
    pub messages: Vec<entities::Message>,
}

#[derive(Debug, Clone)]
pub struct ChatHistory {
    pub chat: entities::Chat,
    pub turns: Vec<TurnHistory>,
}

/// What a successful vote reveals.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub turn_id: Uuid,
    pub model_a: ModelInfo,
    pub model_b: ModelInfo,
    pub new_turn_id: Uuid,
    pub category: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait ArenaService: Send + Sync {
    async fn create_user(&self) -> entities::User;

    /// Creates a chat and its first turn.
    ///
    /// Returns `NotFound` if the user does not exist.
    async fn create_chat(
        &self,
        user_id: Uuid,
        mode: ChatMode,
    ) -> Result<(entities::Chat, entities::Turn), ArenaError>;

    /// A page of the user's chats, most recently active first.
    async fn list_user_chats(&self, user_id: Uuid, limit: usize, offset: usize)
    -> Vec<entities::Chat>;

    async fn chat_history(&self, chat_id: Uuid) -> Result<ChatHistory, ArenaError>;

    /// Accepts a prompt on the chat's current turn.
    ///
    /// Moves the turn from `waiting` to `streaming` and records the user message. Nothing
    /// changes if this fails.
    async fn open_turn(&self, chat_id: Uuid, content: &str) -> Result<entities::Turn, ArenaError>;

    /// Drives both model streams for an opened turn and marks it `completed` at the end.
    ///
    /// The stream always ends with exactly one terminal event. A failed or dropped stream
    /// still moves the turn to `completed`, keeping only the answers that finished.
    fn stream_turn(&self, turn_id: Uuid, prompt: String) -> BoxStream<'static, TurnEvent>;

    /// Records a vote, reveals the models and opens the chat's next turn.
    ///
    /// Fails with `Conflict` while the turn is streaming or once it is voted.
    async fn submit_vote(
        &self,
        turn_id: Uuid,
        winner: Option<&str>,
    ) -> Result<VoteOutcome, ArenaError>;
}

pub trait ResponseGenerator: Send + Sync {
    /// Fragments for model A, then model B. Each finished answer is persisted before the next
    /// model starts. An error ends the stream.
    fn generate(
        &self,
        turn_id: Uuid,
        prompt: String,
    ) -> BoxStream<'static, Result<Fragment, ArenaError>>;
}
