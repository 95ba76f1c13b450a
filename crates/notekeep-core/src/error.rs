//! Error types for notekeep.

use thiserror::Error;

/// Result type alias using notekeep's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notekeep operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Bad input shape or value (non-positive id, blank name, malformed color)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    /// Label not found (or not resolvable for the caller)
    #[error("Label not found: {0}")]
    LabelNotFound(i64),

    /// Entity exists but belongs to another owner
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for every "entity absent" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::NoteNotFound(_) | Error::LabelNotFound(_)
        )
    }

    /// Short, caller-safe description without the variant prefix.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::NotFound(msg) | Error::Unauthorized(msg) => {
                msg.clone()
            }
            Error::NoteNotFound(id) => format!("Note with ID {} not found", id),
            Error::LabelNotFound(id) => format!("Label with ID {} not found", id),
            Error::Database(_) | Error::Internal(_) | Error::Serialization(_) => {
                "An unexpected error occurred".to_string()
            }
            Error::Config(msg) => msg.clone(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
