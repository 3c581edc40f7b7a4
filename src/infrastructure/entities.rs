//! In-memory entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Battle,
    Direct,
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "battle" => Ok(ChatMode::Battle),
            "direct" => Ok(ChatMode::Direct),
            other => Err(format!("unknown chat mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mode: ChatMode,
    pub status: ChatStatus,
    pub name: String,
    /// Turn currently accepting input. Reassigned on every vote.
    pub current_turn_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A concrete model from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
}

/// Vote cast on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    ModelA,
    ModelB,
    Tie,
    BothBad,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::ModelA => "model_a",
            Vote::ModelB => "model_b",
            Vote::Tie => "tie",
            Vote::BothBad => "both_bad",
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model_a" => Ok(Vote::ModelA),
            "model_b" => Ok(Vote::ModelB),
            "tie" => Ok(Vote::Tie),
            "both_bad" => Ok(Vote::BothBad),
            other => Err(format!("invalid winner value `{other}`")),
        }
    }
}

impl Display for Vote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome recorded when a turn is voted on. Only a voted turn has one.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub vote: Vote,
    pub model_a: ModelInfo,
    pub model_b: ModelInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    Waiting,
    Streaming,
    Completed,
    Voted(Verdict),
}

impl TurnState {
    pub fn status(&self) -> TurnStatus {
        match self {
            TurnState::Waiting => TurnStatus::Waiting,
            TurnState::Streaming => TurnStatus::Streaming,
            TurnState::Completed => TurnStatus::Completed,
            TurnState::Voted(_) => TurnStatus::Voted,
        }
    }
}

/// Status of a turn without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Waiting,
    Streaming,
    Completed,
    Voted,
}

impl Display for TurnStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TurnStatus::Waiting => "waiting",
            TurnStatus::Streaming => "streaming",
            TurnStatus::Completed => "completed",
            TurnStatus::Voted => "voted",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: Uuid,
    pub chat_id: Uuid,
    /// 1-based, gapless per chat.
    pub turn_number: u32,
    pub state: TurnState,
}

impl Turn {
    pub fn waiting(chat_id: Uuid, turn_number: u32) -> Turn {
        Turn {
            id: Uuid::new_v4(),
            chat_id,
            turn_number,
            state: TurnState::Waiting,
        }
    }

    pub fn status(&self) -> TurnStatus {
        self.state.status()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match &self.state {
            TurnState::Voted(verdict) => Some(verdict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Anonymous side of a battle, as seen by the client while streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSlot {
    #[serde(rename = "model_a")]
    A,
    #[serde(rename = "model_b")]
    B,
}

impl ModelSlot {
    pub fn id(&self) -> &'static str {
        match self {
            ModelSlot::A => "model_a",
            ModelSlot::B => "model_b",
        }
    }

    /// Position of this slot's answer within the turn. The user prompt is 1.
    pub fn sequence_number(&self) -> u32 {
        match self {
            ModelSlot::A => 2,
            ModelSlot::B => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub role: Role,
    pub content: String,
    pub model_id: Option<String>,
    pub sequence_number: u32,
    pub response_time_ms: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(turn_id: Uuid, content: String) -> Message {
        Message {
            id: Uuid::new_v4(),
            turn_id,
            role: Role::User,
            content,
            model_id: None,
            sequence_number: 1,
            response_time_ms: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(
        turn_id: Uuid,
        slot: ModelSlot,
        content: String,
        response_time_ms: u32,
    ) -> Message {
        Message {
            id: Uuid::new_v4(),
            turn_id,
            role: Role::Assistant,
            content,
            model_id: Some(slot.id().to_owned()),
            sequence_number: slot.sequence_number(),
            response_time_ms: Some(response_time_ms),
            created_at: Utc::now(),
        }
    }
}
