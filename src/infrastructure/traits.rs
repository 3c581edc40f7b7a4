//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use crate::infrastructure::entities::{TurnStatus, Verdict};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(Uuid),
    #[error("chat {0} not found")]
    ChatNotFound(Uuid),
    #[error("turn {0} not found")]
    TurnNotFound(Uuid),
    #[error("turn {0} has already been voted on")]
    AlreadyVoted(Uuid),
    #[error("turn {turn_id} is {actual}, expected {expected}")]
    StatusMismatch {
        turn_id: Uuid,
        expected: TurnStatus,
        actual: TurnStatus,
    },
    #[error("turn {0} is still streaming")]
    StillStreaming(Uuid),
    #[error("turn {0} can only be voted through a vote commit")]
    VoteRequired(Uuid),
}

/// Result of a committed vote.
#[derive(Debug, Clone)]
pub struct VoteCommit {
    pub voted: entities::Turn,
    pub next: entities::Turn,
    pub chat: entities::Chat,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_user(&self) -> entities::User;

    /// Creates a chat together with its first, waiting turn.
    async fn create_chat(
        &self,
        user_id: Uuid,
        mode: entities::ChatMode,
    ) -> Result<(entities::Chat, entities::Turn), StoreError>;

    async fn get_chat(&self, chat_id: Uuid) -> Option<entities::Chat>;

    async fn get_turn(&self, turn_id: Uuid) -> Option<entities::Turn>;

    /// Turns of a chat, ascending by turn number.
    async fn get_chat_turns(&self, chat_id: Uuid) -> Vec<entities::Turn>;

    /// Messages of a turn in append order.
    async fn get_turn_messages(&self, turn_id: Uuid) -> Vec<entities::Message>;

    /// Chats of a user, most recently updated first.
    async fn get_user_chats(&self, user_id: Uuid) -> Vec<entities::Chat>;

    /// Appends a message. Sequence numbers are not checked here.
    async fn add_message(
        &self,
        turn_id: Uuid,
        message: entities::Message,
    ) -> Result<(), StoreError>;

    /// Overwrites the status of a turn that has not been voted on.
    async fn update_turn_status(
        &self,
        turn_id: Uuid,
        status: TurnStatus,
    ) -> Result<entities::Turn, StoreError>;

    /// Moves a turn from `from` to `to`, failing if it is not currently in `from`.
    async fn transition_turn(
        &self,
        turn_id: Uuid,
        from: TurnStatus,
        to: TurnStatus,
    ) -> Result<entities::Turn, StoreError>;

    /// Records the verdict, opens the next turn and repoints the chat, all at once.
    ///
    /// A turn that is still streaming cannot be voted on.
    async fn commit_vote(&self, turn_id: Uuid, verdict: Verdict) -> Result<VoteCommit, StoreError>;
}
