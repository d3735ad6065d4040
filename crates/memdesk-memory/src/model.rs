//! Memory record model shared by stores and the support agent.

use crate::error::MemoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque customer identity. All memory operations are scoped to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user id, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> Result<Self, MemoryError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(MemoryError::InvalidUserId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = MemoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Origin of a remembered piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    /// Text written by the customer.
    User,
    /// Text produced by the support agent.
    Assistant,
    /// Seeded or generated background facts.
    System,
}

impl MemoryRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryRole::User => "user",
            MemoryRole::Assistant => "assistant",
            MemoryRole::System => "system",
        }
    }

    /// Parse a lowercase role label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(MemoryRole::User),
            "assistant" => Some(MemoryRole::Assistant),
            "system" => Some(MemoryRole::System),
            _ => None,
        }
    }
}

/// Metadata attached to every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    /// Application tag so several apps can share one store.
    pub app_id: String,
    /// Role that produced the text.
    pub role: MemoryRole,
}

impl MemoryMetadata {
    pub fn new(app_id: impl Into<String>, role: MemoryRole) -> Self {
        Self {
            app_id: app_id.into(),
            role,
        }
    }
}

/// A write request for a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemory {
    /// Owning user.
    pub user_id: UserId,
    /// Text to remember.
    pub content: String,
    /// Application and role tags.
    pub metadata: MemoryMetadata,
}

impl NewMemory {
    pub fn new(user_id: UserId, content: impl Into<String>, metadata: MemoryMetadata) -> Self {
        Self {
            user_id,
            content: content.into(),
            metadata,
        }
    }
}

/// A stored memory as returned by a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Store-assigned identifier.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Remembered text.
    pub content: String,
    /// Metadata as stored. Remote stores may add or omit fields.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Creation timestamp when the store reports one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// Role tag from metadata, if present and recognised.
    pub fn role(&self) -> Option<MemoryRole> {
        self.metadata
            .get("role")
            .and_then(serde_json::Value::as_str)
            .and_then(MemoryRole::parse)
    }

    /// Application tag from metadata, if present.
    pub fn app_id(&self) -> Option<&str> {
        self.metadata
            .get("app_id")
            .and_then(serde_json::Value::as_str)
    }
}

/// A search result with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryHit {
    pub record: MemoryRecord,
    /// Higher is more relevant. Remote stores may not report a score.
    pub score: Option<f32>,
}
