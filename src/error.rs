//! Error types for the duel engine

use crate::loader::ValidationReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("No handler registered for action type '{0}'")]
    UnregisteredAction(String),

    #[error("Resume input does not match the pending decision: {0}")]
    InvalidResume(String),

    #[error("Card database failed validation with {} error(s)", .0.errors().count())]
    Validation(ValidationReport),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, DuelError>;
