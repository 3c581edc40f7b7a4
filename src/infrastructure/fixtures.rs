//! Demo data for frontend development

use crate::core::random::ArenaRandom;
use crate::infrastructure::catalog::ReferenceData;
use crate::infrastructure::entities::{
    Chat, ChatMode, Message, ModelSlot, TurnStatus, Verdict, Vote,
};
use crate::infrastructure::traits::{EntityStore, StoreError};
use log::info;

const DEMO_PROMPT: &str = "Write a compelling meta description for a landing page about AI-powered marketing tools";

const DEMO_ANSWER_A: &str = "Boost your marketing with AI-powered tools that analyze, automate and optimize \
every campaign. Start your free trial today.";

const DEMO_ANSWER_B: &str = "Smarter campaigns start here: AI marketing tools that write, test and improve \
your content while you focus on growth.";

/// Seeds one user with a chat whose first turn is answered and voted, and whose second turn is
/// waiting for input.
pub async fn seed_demo_data(
    store: &dyn EntityStore,
    reference: &ReferenceData,
    random: &ArenaRandom,
) -> Result<Chat, StoreError> {
    let user = store.create_user().await;
    let (chat, turn) = store.create_chat(user.id, ChatMode::Battle).await?;

    store.update_turn_status(turn.id, TurnStatus::Streaming).await?;
    store
        .add_message(turn.id, Message::user(turn.id, DEMO_PROMPT.to_owned()))
        .await?;
    for (slot, answer) in [(ModelSlot::A, DEMO_ANSWER_A), (ModelSlot::B, DEMO_ANSWER_B)] {
        let message = Message::assistant(turn.id, slot, answer.to_owned(), random.response_time_ms());
        store.add_message(turn.id, message).await?;
    }
    store.update_turn_status(turn.id, TurnStatus::Completed).await?;

    let models = reference.models();
    let verdict = match random.model_pair(models) {
        Some((model_a, model_b)) => Verdict {
            vote: Vote::ModelA,
            model_a,
            model_b,
        },
        None => return Ok(chat),
    };
    let commit = store.commit_vote(turn.id, verdict).await?;

    info!(
        "seeded demo user {} with chat {} (current turn {})",
        user.id, commit.chat.id, commit.chat.current_turn_id
    );
    Ok(commit.chat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryDatabase;
    use crate::infrastructure::repositories::MemoryEntityStore;
    use di::Ref;

    #[tokio::test]
    async fn test_seeded_chat_has_a_voted_turn_and_an_open_one() {
        let store = MemoryEntityStore::new(Ref::new(MemoryDatabase::default()));

        let chat = seed_demo_data(&store, &ReferenceData::builtin(), &ArenaRandom::seeded(2))
            .await
            .unwrap();

        let turns = store.get_chat_turns(chat.id).await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].status(), TurnStatus::Voted);
        assert_eq!(turns[1].status(), TurnStatus::Waiting);
        assert_eq!(chat.current_turn_id, turns[1].id);

        let messages = store.get_turn_messages(turns[0].id).await;
        let sequence: Vec<u32> = messages.iter().map(|m| m.sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3]);
    }
}
