use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the Canary API client and the state holders built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response. `message` is the server's error text when the body
    /// carried one, otherwise the operation's generic fallback.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("Request timed out after {0:?}")]
    RequestTimedOut(Duration),

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// An authentication response without both a token and a user.
    #[error("Authentication response did not contain a token and user")]
    MissingCredential,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the error means the stored credential can no longer be used.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::SessionExpired | ClientError::InvalidToken(_)
        )
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
