//! Events produced while a turn is streaming

use crate::core::error::ArenaError;
use crate::infrastructure::entities::{ModelSlot, TurnStatus};
use uuid::Uuid;

/// One incremental piece of a model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub model_id: ModelSlot,
    pub content: String,
    /// 1-based position within this model's stream.
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    Fragment(Fragment),
    Completed { turn_id: Uuid, status: TurnStatus },
    Failed { error: String, reason: String },
}

impl TurnEvent {
    /// Builds the client-facing failure. The error detail stays out of it.
    pub fn failed(error: &ArenaError) -> TurnEvent {
        TurnEvent::Failed {
            error: "Failed to generate response".to_owned(),
            reason: error.code().to_owned(),
        }
    }

    /// Nothing is sent after a terminal event.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TurnEvent::Fragment(_))
    }
}
