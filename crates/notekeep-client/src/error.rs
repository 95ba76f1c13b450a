//! Client error types.

use thiserror::Error;

/// Result type for client calls.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally, no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure (connection, timeout, TLS).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error envelope.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<notekeep_core::Error> for ClientError {
    fn from(err: notekeep_core::Error) -> Self {
        ClientError::Validation(err.public_message())
    }
}
