//! Search options and lexical scoring.

use crate::model::{MemoryHit, MemoryRecord};
use std::collections::HashSet;

/// Default number of hits returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Options for a similarity search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Maximum number of hits.
    pub limit: usize,
    /// Optional minimum score filter.
    pub min_score: Option<f32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            min_score: None,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Drop hits under `min_score`, order best first and cap at `limit`.
    ///
    /// Hits without a score are kept and ordered after scored ones; the sort is
    /// stable so store order breaks ties.
    pub fn apply(&self, mut hits: Vec<MemoryHit>) -> Vec<MemoryHit> {
        if let Some(min_score) = self.min_score {
            hits.retain(|hit| hit.score.is_none_or(|score| score >= min_score));
        }
        hits.sort_by(|a, b| {
            let a = a.score.unwrap_or(f32::NEG_INFINITY);
            let b = b.score.unwrap_or(f32::NEG_INFINITY);
            b.total_cmp(&a)
        });
        hits.truncate(self.limit);
        hits
    }
}

/// Split text into distinct lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> HashSet<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Score a record against query tokens: fraction of query tokens it contains.
pub(crate) fn lexical_score(query_tokens: &HashSet<String>, record: &MemoryRecord) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let record_tokens = tokenize(&record.content);
    let matched = query_tokens
        .iter()
        .filter(|token| record_tokens.contains(*token))
        .count();
    matched as f32 / query_tokens.len() as f32
}
