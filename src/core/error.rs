//! Arena error taxonomy

use crate::infrastructure::traits::StoreError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ArenaError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    /// The target is in a state that does not allow the operation.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure. The message is for logs only.
    #[error("{0}")]
    Internal(String),
}

impl ArenaError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ArenaError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ArenaError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ArenaError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ArenaError::Internal(message.into())
    }

    /// Machine-stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            ArenaError::InvalidArgument(_) => "invalid_argument",
            ArenaError::NotFound(_) => "not_found",
            ArenaError::Conflict(_) => "conflict",
            ArenaError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ArenaError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UserNotFound(_) => ArenaError::not_found("User not found"),
            StoreError::ChatNotFound(_) => ArenaError::not_found("Chat not found"),
            StoreError::TurnNotFound(_) => ArenaError::not_found("Turn not found"),
            StoreError::AlreadyVoted(_) => ArenaError::conflict("Turn already voted"),
            StoreError::StillStreaming(_) => ArenaError::conflict("Turn is still streaming"),
            StoreError::StatusMismatch { actual, .. } => {
                ArenaError::conflict(format!("Turn is {actual}"))
            }
            StoreError::VoteRequired(_) => ArenaError::internal(error.to_string()),
        }
    }
}
