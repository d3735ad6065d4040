//! Result types returned by the support agent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the recall step found before the completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "count")]
pub enum RecallStatus {
    /// The store returned this many memories.
    Hits(usize),
    /// The store answered with no memories.
    Empty,
    /// The store answered with a payload that could not be read.
    Malformed,
    /// The store call failed, so the pipeline stopped.
    Failed,
}

/// Outcome of one query, including how it degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReport {
    /// Text returned to the customer. Never empty.
    pub answer: String,
    /// Recall outcome.
    pub recall: RecallStatus,
    /// True when `answer` is the fallback apology.
    pub fallback: bool,
    /// Error that forced the fallback, if any.
    pub error: Option<String>,
}

/// A generated customer profile and the facts stored from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticProfile {
    /// The parsed profile object.
    pub data: Map<String, Value>,
    /// Facts written to memory, in write order.
    pub facts: Vec<String>,
}
