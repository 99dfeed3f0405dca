//! Error types for the poll cycle

use thiserror::Error;

/// Result type alias for poll operations
pub type Result<T> = std::result::Result<T, PollError>;

/// Errors that can occur during a poll cycle
#[derive(Error, Debug)]
pub enum PollError {
    /// Fetch failed or the endpoint answered with a non-success status
    #[error("Network error: {0}")]
    Network(String),

    /// Payload shape was invalid; the poll is discarded
    #[error("Parse error: {0}")]
    Parse(#[from] metrics_engine::ParseError),

    /// Persistence failed; in-memory state stays usable but is not durable
    #[error("Storage error: {0}")]
    Storage(#[from] snapshot_store::StoreError),
}

impl PollError {
    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Short classification label for status displays
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
