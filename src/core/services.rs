//! Implementations for the service the app needs.
//!

use crate::core::error::ArenaError;
use crate::core::events::TurnEvent;
use crate::core::random::ArenaRandom;
use crate::core::traits::{
    ArenaService, ChatHistory, ResponseGenerator, TurnHistory, VoteOutcome,
};
use crate::infrastructure::catalog::ReferenceData;
use crate::infrastructure::entities::{
    Chat, ChatMode, Message, Turn, TurnStatus, User, Verdict, Vote,
};
use crate::infrastructure::traits::{EntityStore, StoreError};
use async_stream::stream;
use async_trait::async_trait;
use di::{Ref, injectable};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use log::{debug, error, info, warn};
use tokio::runtime::Handle;
use uuid::Uuid;

/// Ends a turn's streaming phase. Later answers may be missing if the stream failed.
async fn close_turn(store: &dyn EntityStore, turn_id: Uuid) -> Result<Turn, StoreError> {
    store
        .transition_turn(turn_id, TurnStatus::Streaming, TurnStatus::Completed)
        .await
}

/// Closes the turn if its event stream is dropped before it finishes, e.g. when the client
/// disconnects. The turn then accepts a vote and the chat can move on.
struct StreamGuard {
    store: Ref<dyn EntityStore>,
    turn_id: Uuid,
    armed: bool,
}

impl StreamGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let store = self.store.clone();
        let turn_id = self.turn_id;
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    match close_turn(&*store, turn_id).await {
                        Ok(_) => info!("turn {turn_id}: stream abandoned, turn closed"),
                        Err(error) => debug!("turn {turn_id}: abandoned stream left as is: {error}"),
                    }
                });
            }
            Err(_) => warn!("turn {turn_id}: stream dropped outside a runtime, turn left streaming"),
        }
    }
}

#[injectable(ArenaService)]
pub struct MyArenaService {
    store: Ref<dyn EntityStore>,
    generator: Ref<dyn ResponseGenerator>,
    reference: Ref<ReferenceData>,
    random: Ref<ArenaRandom>,
}

impl MyArenaService {
    pub fn new(
        store: Ref<dyn EntityStore>,
        generator: Ref<dyn ResponseGenerator>,
        reference: Ref<ReferenceData>,
        random: Ref<ArenaRandom>,
    ) -> Self {
        Self {
            store,
            generator,
            reference,
            random,
        }
    }
}

#[async_trait]
impl ArenaService for MyArenaService {
    async fn create_user(&self) -> User {
        let user = self.store.create_user().await;
        info!("created user {}", user.id);
        user
    }

    async fn create_chat(&self, user_id: Uuid, mode: ChatMode) -> Result<(Chat, Turn), ArenaError> {
        if mode != ChatMode::Battle {
            // direct chats are not wired end-to-end yet
            warn!("chat mode {mode:?} requested, creating a battle chat instead");
        }

        let (chat, turn) = self.store.create_chat(user_id, ChatMode::Battle).await?;
        info!("created chat {} with turn {} for user {user_id}", chat.id, turn.id);
        Ok((chat, turn))
    }

    async fn list_user_chats(&self, user_id: Uuid, limit: usize, offset: usize) -> Vec<Chat> {
        self.store
            .get_user_chats(user_id)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect()
    }

    async fn chat_history(&self, chat_id: Uuid) -> Result<ChatHistory, ArenaError> {
        let chat = self
            .store
            .get_chat(chat_id)
            .await
            .ok_or_else(|| ArenaError::not_found("Chat not found"))?;

        let mut turns = Vec::new();
        for turn in self.store.get_chat_turns(chat_id).await {
            let messages = self.store.get_turn_messages(turn.id).await;
            turns.push(TurnHistory { turn, messages });
        }

        Ok(ChatHistory { chat, turns })
    }

    async fn open_turn(&self, chat_id: Uuid, content: &str) -> Result<Turn, ArenaError> {
        if content.trim().is_empty() {
            return Err(ArenaError::invalid_argument("content is required"));
        }

        let chat = self
            .store
            .get_chat(chat_id)
            .await
            .ok_or_else(|| ArenaError::not_found("Chat not found"))?;

        let turn = self
            .store
            .transition_turn(
                chat.current_turn_id,
                TurnStatus::Waiting,
                TurnStatus::Streaming,
            )
            .await
            .map_err(|error| match error {
                StoreError::StatusMismatch { actual, .. } => {
                    ArenaError::conflict(format!("Turn is already {actual}"))
                }
                other => other.into(),
            })?;

        self.store
            .add_message(turn.id, Message::user(turn.id, content.to_owned()))
            .await?;

        info!("turn {} of chat {chat_id} is streaming", turn.id);
        Ok(turn)
    }

    fn stream_turn(&self, turn_id: Uuid, prompt: String) -> BoxStream<'static, TurnEvent> {
        let store = self.store.clone();
        let mut fragments = self.generator.generate(turn_id, prompt);
        let mut guard = StreamGuard {
            store: store.clone(),
            turn_id,
            armed: true,
        };

        Box::pin(stream! {
            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        yield TurnEvent::Fragment(fragment);
                    }
                    Err(error) => {
                        error!("turn {turn_id}: generation failed: {error}");
                        if let Err(close) = close_turn(&*store, turn_id).await {
                            warn!("turn {turn_id}: could not be closed: {close}");
                        }
                        guard.disarm();
                        yield TurnEvent::failed(&error);
                        return;
                    }
                }
            }

            let closed = close_turn(&*store, turn_id).await;
            guard.disarm();
            match closed {
                Ok(turn) => {
                    info!("turn {turn_id} completed");
                    yield TurnEvent::Completed { turn_id, status: turn.status() };
                }
                Err(error) => {
                    let error = ArenaError::from(error);
                    error!("turn {turn_id}: could not be completed: {error}");
                    yield TurnEvent::failed(&error);
                }
            }
        })
    }

    async fn submit_vote(&self, turn_id: Uuid, winner: Option<&str>) -> Result<VoteOutcome, ArenaError> {
        let turn = self
            .store
            .get_turn(turn_id)
            .await
            .ok_or_else(|| ArenaError::not_found("Turn not found"))?;

        match turn.status() {
            TurnStatus::Voted => return Err(ArenaError::conflict("Turn already voted")),
            TurnStatus::Streaming => return Err(ArenaError::conflict("Turn is still streaming")),
            TurnStatus::Waiting | TurnStatus::Completed => {}
        }

        let vote = winner
            .ok_or_else(|| ArenaError::invalid_argument("winner is required"))?
            .parse::<Vote>()
            .map_err(ArenaError::invalid_argument)?;

        let (model_a, model_b) = self
            .random
            .model_pair(self.reference.models())
            .ok_or_else(|| ArenaError::internal("model catalog needs at least two models"))?;

        let commit = self
            .store
            .commit_vote(
                turn_id,
                Verdict {
                    vote,
                    model_a: model_a.clone(),
                    model_b: model_b.clone(),
                },
            )
            .await?;

        info!(
            "turn {turn_id} voted {vote}: model_a={}, model_b={}; next turn {}",
            model_a.id, model_b.id, commit.next.id
        );

        let (category, tags) = self.reference.random_topic(&self.random).unwrap_or_default();

        Ok(VoteOutcome {
            turn_id: commit.voted.id,
            model_a,
            model_b,
            new_turn_id: commit.next.id,
            category,
            tags,
        })
    }
}
