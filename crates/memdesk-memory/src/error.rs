//! Error types for memory operations.

/// Errors returned by memory stores and helpers.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
    /// User identity was empty.
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),
    /// Transport failure talking to a remote store.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Remote store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Remote store answered with a body of unexpected shape.
    #[error("malformed store response: {0}")]
    Malformed(String),
}

impl MemoryError {
    /// True when the store answered but the payload could not be interpreted.
    pub fn is_malformed(&self) -> bool {
        matches!(self, MemoryError::Malformed(_))
    }
}
