//! Error types for Repsense

use thiserror::Error;

/// Errors that can occur during detection, scoring, or session handling
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Message text is empty or blank")]
    EmptyMessage,

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown conversational state label: {0}")]
    InvalidStateLabel(String),

    #[error("Transcript turn {index} is malformed: {reason}")]
    MalformedTurn { index: usize, reason: String },

    #[error("Failed to parse transcript: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
