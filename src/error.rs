// src/error.rs
use thiserror::Error;

/// Errors surfaced by building, persisting and loading a suggest index.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact decode failed: {0}")]
    Decode(String),

    #[error("item data cannot be structured: {0}")]
    Structure(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid item record at line {line}: {reason}")]
    Items { line: usize, reason: String },
}

impl From<prost::DecodeError> for SuggestError {
    fn from(e: prost::DecodeError) -> Self {
        SuggestError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SuggestError>;
