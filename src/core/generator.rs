//! Dual-stream response generator.
//!
//! Replays one canned answer twice, as "model A" and then "model B", pausing between
//! fragments to imitate typing. Model B gets small random whitespace variations so the
//! two panes do not look identical.

use crate::core::error::ArenaError;
use crate::core::events::Fragment;
use crate::core::random::ArenaRandom;
use crate::core::traits::ResponseGenerator;
use crate::infrastructure::config::ArenaConfig;
use crate::infrastructure::entities::{Message, ModelSlot};
use crate::infrastructure::traits::EntityStore;
use async_stream::stream;
use di::{Ref, injectable};
use futures_util::stream::BoxStream;
use log::{debug, info};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use uuid::Uuid;

const RESPONSE_FRAGMENTS: &[&str] = &[
    "Here's a comprehensive response to your marketing question. ",
    "Based on current best practices and industry trends, ",
    "I recommend the following strategic approach:\n\n",
    "1. **Research & Analysis**: Start by conducting thorough market research ",
    "and analyzing your target audience's behavior patterns.\n\n",
    "2. **Content Strategy**: Develop a content plan that aligns with ",
    "your audience's needs and search intent.\n\n",
    "3. **Optimization**: Apply SEO best practices including ",
    "keyword optimization, meta tags, and structured data.\n\n",
    "4. **Engagement**: Focus on creating engaging, valuable content ",
    "that resonates with your audience.\n\n",
    "5. **Measurement**: Track performance metrics and iterate ",
    "based on data-driven insights.\n\n",
    "This approach should help you achieve your marketing objectives ",
    "while maintaining authenticity and providing real value to your audience.",
];

/// The fragments both models replay. The prompt does not influence them.
pub fn response_fragments(_prompt: &str) -> Vec<String> {
    RESPONSE_FRAGMENTS.iter().map(|f| (*f).to_owned()).collect()
}

/// Sleeps for `pause`, but never past the deadline.
async fn pause_until(pause: Duration, deadline: Option<Instant>) {
    let wake = Instant::now() + pause;
    sleep_until(deadline.map_or(wake, |deadline| deadline.min(wake))).await;
}

#[injectable(ResponseGenerator)]
pub struct DualStreamGenerator {
    store: Ref<dyn EntityStore>,
    config: Ref<ArenaConfig>,
    random: Ref<ArenaRandom>,
}

impl DualStreamGenerator {
    pub fn new(
        store: Ref<dyn EntityStore>,
        config: Ref<ArenaConfig>,
        random: Ref<ArenaRandom>,
    ) -> Self {
        Self {
            store,
            config,
            random,
        }
    }
}

impl ResponseGenerator for DualStreamGenerator {
    fn generate(
        &self,
        turn_id: Uuid,
        prompt: String,
    ) -> BoxStream<'static, Result<Fragment, ArenaError>> {
        let store = self.store.clone();
        let config = self.config.clone();
        let random = self.random.clone();
        let fragments = response_fragments(&prompt);

        Box::pin(stream! {
            let deadline = config.stream_timeout.map(|timeout| Instant::now() + timeout);
            let started = Instant::now();

            for slot in [ModelSlot::A, ModelSlot::B] {
                let pause = match slot {
                    ModelSlot::A => config.model_a_delay,
                    ModelSlot::B => {
                        pause_until(config.inter_model_delay, deadline).await;
                        config.model_b_delay
                    }
                };

                let mut answer = String::new();
                for (index, text) in fragments.iter().enumerate() {
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        yield Err(ArenaError::internal(format!(
                            "turn {turn_id}: stream deadline exceeded while {} was answering",
                            slot.id()
                        )));
                        return;
                    }

                    let content = match slot {
                        ModelSlot::A => text.clone(),
                        ModelSlot::B => random.vary_fragment(text),
                    };
                    answer.push_str(&content);

                    yield Ok(Fragment {
                        model_id: slot,
                        content,
                        sequence: index as u32 + 1,
                    });

                    pause_until(pause, deadline).await;
                }

                let message = Message::assistant(turn_id, slot, answer, random.response_time_ms());
                if let Err(error) = store.add_message(turn_id, message).await {
                    yield Err(error.into());
                    return;
                }
                debug!("turn {turn_id}: stored answer of {}", slot.id());
            }

            info!("turn {turn_id}: both answers generated in {:?}", started.elapsed());
        })
    }
}
