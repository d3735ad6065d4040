//! Error types for the support agent.

use memdesk_memory::MemoryError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised inside the support pipeline.
///
/// `handle_query` and `generate_synthetic_profile` absorb these; the
/// `try_` and report variants expose them.
#[derive(Debug, Error)]
pub enum SupportError {
    /// Memory store error.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    /// Completion service error.
    #[error("completion error: {0}")]
    Completion(String),
    /// Completion succeeded but carried no usable text.
    #[error("completion returned no text")]
    MalformedCompletion,
    /// Completion did not answer within the configured deadline.
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
    /// Synthetic profile could not be used.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Reasons a generated profile is rejected before anything is stored.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Completion text is not JSON.
    #[error("profile is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),
    /// JSON parsed but the top level is not a non-empty object.
    #[error("profile has the wrong shape: {0}")]
    WrongShape(String),
}
