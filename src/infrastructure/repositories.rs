//! Store implementation over the in-memory tables

use crate::infrastructure::entities::{
    Chat, ChatMode, ChatStatus, Message, Turn, TurnState, TurnStatus, User, Verdict,
};
use crate::infrastructure::memory::MemoryDatabase;
use crate::infrastructure::traits::{EntityStore, StoreError, VoteCommit};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::debug;
use uuid::Uuid;

const DEFAULT_CHAT_NAME: &str = "Untitled Chat";

#[injectable(EntityStore)]
pub struct MemoryEntityStore {
    database: Ref<MemoryDatabase>,
}

impl MemoryEntityStore {
    pub fn new(database: Ref<MemoryDatabase>) -> Self {
        Self { database }
    }
}

fn state_for(status: TurnStatus) -> Option<TurnState> {
    match status {
        TurnStatus::Waiting => Some(TurnState::Waiting),
        TurnStatus::Streaming => Some(TurnState::Streaming),
        TurnStatus::Completed => Some(TurnState::Completed),
        TurnStatus::Voted => None,
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn create_user(&self) -> User {
        let user = User {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let mut tables = self.database.write().await;
        tables.users.insert(user.id, user.clone());
        tables.user_chats.insert(user.id, Vec::new());

        user
    }

    async fn create_chat(&self, user_id: Uuid, mode: ChatMode) -> Result<(Chat, Turn), StoreError> {
        let mut tables = self.database.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }

        let chat_id = Uuid::new_v4();
        let turn = Turn::waiting(chat_id, 1);
        let now = Utc::now();
        let chat = Chat {
            id: chat_id,
            user_id,
            mode,
            status: ChatStatus::Active,
            name: DEFAULT_CHAT_NAME.to_owned(),
            current_turn_id: turn.id,
            created_at: now,
            updated_at: now,
        };

        tables.chats.insert(chat.id, chat.clone());
        tables.turns.insert(turn.id, turn.clone());
        tables.messages.insert(turn.id, Vec::new());
        tables.user_chats.entry(user_id).or_default().push(chat.id);

        Ok((chat, turn))
    }

    async fn get_chat(&self, chat_id: Uuid) -> Option<Chat> {
        self.database.read().await.chats.get(&chat_id).cloned()
    }

    async fn get_turn(&self, turn_id: Uuid) -> Option<Turn> {
        self.database.read().await.turns.get(&turn_id).cloned()
    }

    async fn get_chat_turns(&self, chat_id: Uuid) -> Vec<Turn> {
        let tables = self.database.read().await;
        let mut turns: Vec<Turn> = tables
            .turns
            .values()
            .filter(|turn| turn.chat_id == chat_id)
            .cloned()
            .collect();
        turns.sort_by_key(|turn| turn.turn_number);
        turns
    }

    async fn get_turn_messages(&self, turn_id: Uuid) -> Vec<Message> {
        self.database
            .read()
            .await
            .messages
            .get(&turn_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn get_user_chats(&self, user_id: Uuid) -> Vec<Chat> {
        let tables = self.database.read().await;
        let Some(chat_ids) = tables.user_chats.get(&user_id) else {
            return Vec::new();
        };

        // newest first, so equal timestamps keep the latest chat on top
        let mut chats: Vec<Chat> = chat_ids
            .iter()
            .rev()
            .filter_map(|id| tables.chats.get(id).cloned())
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        chats
    }

    async fn add_message(&self, turn_id: Uuid, message: Message) -> Result<(), StoreError> {
        let mut tables = self.database.write().await;
        if !tables.turns.contains_key(&turn_id) {
            return Err(StoreError::TurnNotFound(turn_id));
        }

        tables.messages.entry(turn_id).or_default().push(message);
        Ok(())
    }

    async fn update_turn_status(&self, turn_id: Uuid, status: TurnStatus) -> Result<Turn, StoreError> {
        let mut tables = self.database.write().await;
        let turn = tables
            .turns
            .get_mut(&turn_id)
            .ok_or(StoreError::TurnNotFound(turn_id))?;

        if turn.status() == TurnStatus::Voted {
            return Err(StoreError::AlreadyVoted(turn_id));
        }
        turn.state = state_for(status).ok_or(StoreError::VoteRequired(turn_id))?;

        Ok(turn.clone())
    }

    async fn transition_turn(
        &self,
        turn_id: Uuid,
        from: TurnStatus,
        to: TurnStatus,
    ) -> Result<Turn, StoreError> {
        let mut tables = self.database.write().await;
        let turn = tables
            .turns
            .get_mut(&turn_id)
            .ok_or(StoreError::TurnNotFound(turn_id))?;

        let actual = turn.status();
        if actual != from {
            return Err(StoreError::StatusMismatch {
                turn_id,
                expected: from,
                actual,
            });
        }
        turn.state = state_for(to).ok_or(StoreError::VoteRequired(turn_id))?;

        debug!("turn {turn_id}: {from} -> {to}");
        Ok(turn.clone())
    }

    async fn commit_vote(&self, turn_id: Uuid, verdict: Verdict) -> Result<VoteCommit, StoreError> {
        let mut tables = self.database.write().await;

        let (chat_id, turn_number) = match tables.turns.get(&turn_id) {
            None => return Err(StoreError::TurnNotFound(turn_id)),
            Some(turn) if turn.verdict().is_some() => {
                return Err(StoreError::AlreadyVoted(turn_id));
            }
            Some(turn) if turn.status() == TurnStatus::Streaming => {
                return Err(StoreError::StillStreaming(turn_id));
            }
            Some(turn) => (turn.chat_id, turn.turn_number),
        };
        if !tables.chats.contains_key(&chat_id) {
            return Err(StoreError::ChatNotFound(chat_id));
        }

        // every check is done; nothing below can fail
        let next = Turn::waiting(chat_id, turn_number + 1);
        tables.turns.insert(next.id, next.clone());
        tables.messages.insert(next.id, Vec::new());

        let voted = match tables.turns.get_mut(&turn_id) {
            Some(turn) => {
                turn.state = TurnState::Voted(verdict);
                turn.clone()
            }
            None => return Err(StoreError::TurnNotFound(turn_id)),
        };

        let chat = match tables.chats.get_mut(&chat_id) {
            Some(chat) => {
                chat.current_turn_id = next.id;
                chat.updated_at = Utc::now();
                chat.clone()
            }
            None => return Err(StoreError::ChatNotFound(chat_id)),
        };

        Ok(VoteCommit { voted, next, chat })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::entities::{ModelInfo, Vote};

    fn store() -> MemoryEntityStore {
        MemoryEntityStore::new(Ref::new(MemoryDatabase::default()))
    }

    fn verdict(vote: Vote) -> Verdict {
        let model = |id: &str| ModelInfo {
            id: id.to_owned(),
            name: id.to_uppercase(),
            provider: "Test".to_owned(),
        };
        Verdict {
            vote,
            model_a: model("alpha"),
            model_b: model("beta"),
        }
    }

    #[tokio::test]
    async fn test_create_chat_for_unknown_user_fails() {
        let store = store();
        let user_id = Uuid::new_v4();

        let result = store.create_chat(user_id, ChatMode::Battle).await;

        assert_eq!(result.unwrap_err(), StoreError::UserNotFound(user_id));
        assert!(store.get_user_chats(user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_turn_status_cannot_set_voted() {
        let store = store();
        let user = store.create_user().await;
        let (_, turn) = store.create_chat(user.id, ChatMode::Battle).await.unwrap();

        let result = store.update_turn_status(turn.id, TurnStatus::Voted).await;

        assert_eq!(result.unwrap_err(), StoreError::VoteRequired(turn.id));
        assert_eq!(
            store.get_turn(turn.id).await.unwrap().status(),
            TurnStatus::Waiting
        );
    }

    #[tokio::test]
    async fn test_transition_turn_rejects_wrong_source_state() {
        let store = store();
        let user = store.create_user().await;
        let (_, turn) = store.create_chat(user.id, ChatMode::Battle).await.unwrap();

        store
            .transition_turn(turn.id, TurnStatus::Waiting, TurnStatus::Streaming)
            .await
            .unwrap();
        let second = store
            .transition_turn(turn.id, TurnStatus::Waiting, TurnStatus::Streaming)
            .await;

        assert_eq!(
            second.unwrap_err(),
            StoreError::StatusMismatch {
                turn_id: turn.id,
                expected: TurnStatus::Waiting,
                actual: TurnStatus::Streaming,
            }
        );
    }

    #[tokio::test]
    async fn test_commit_vote_is_write_once() {
        let store = store();
        let user = store.create_user().await;
        let (chat, turn) = store.create_chat(user.id, ChatMode::Battle).await.unwrap();

        let commit = store.commit_vote(turn.id, verdict(Vote::ModelA)).await.unwrap();
        assert_eq!(commit.next.turn_number, 2);
        assert_eq!(commit.chat.current_turn_id, commit.next.id);
        assert!(commit.chat.updated_at >= chat.updated_at);

        let again = store.commit_vote(turn.id, verdict(Vote::ModelB)).await;
        assert_eq!(again.unwrap_err(), StoreError::AlreadyVoted(turn.id));

        let stored = store.get_turn(turn.id).await.unwrap();
        assert_eq!(stored.verdict().map(|v| v.vote), Some(Vote::ModelA));
        assert_eq!(store.get_chat_turns(chat.id).await.len(), 2);
        assert_eq!(
            store.update_turn_status(turn.id, TurnStatus::Waiting).await,
            Err(StoreError::AlreadyVoted(turn.id))
        );
    }

    #[tokio::test]
    async fn test_commit_vote_rejects_streaming_turn() {
        let store = store();
        let user = store.create_user().await;
        let (chat, turn) = store.create_chat(user.id, ChatMode::Battle).await.unwrap();
        store
            .transition_turn(turn.id, TurnStatus::Waiting, TurnStatus::Streaming)
            .await
            .unwrap();

        let result = store.commit_vote(turn.id, verdict(Vote::Tie)).await;

        assert_eq!(result.unwrap_err(), StoreError::StillStreaming(turn.id));
        assert_eq!(
            store.get_turn(turn.id).await.unwrap().status(),
            TurnStatus::Streaming
        );
        assert_eq!(store.get_chat(chat.id).await.unwrap(), chat);
        assert_eq!(store.get_chat_turns(chat.id).await.len(), 1);
    }
}
