//! Capture policy applied to memories before they are persisted.

use crate::error::MemoryError;
use crate::model::NewMemory;
use regex::Regex;

/// Policy for deciding what is stored and how it is sanitised.
#[derive(Debug, Clone)]
pub struct MemoryCapturePolicy {
    /// Patterns that deny capture entirely.
    pub deny_patterns: Vec<String>,
    /// Patterns to redact from captured content.
    pub redact_patterns: Vec<String>,
    /// Optional maximum content length in characters.
    pub max_chars: Option<usize>,
    /// Redact high-entropy tokens that look like secrets.
    pub detect_secrets: bool,
    /// Entropy threshold for secret detection.
    pub secret_entropy_threshold: f32,
    /// Replacement string for redactions.
    pub redaction_replacement: String,
}

impl Default for MemoryCapturePolicy {
    fn default() -> Self {
        Self {
            deny_patterns: Vec::new(),
            redact_patterns: Vec::new(),
            max_chars: None,
            detect_secrets: false,
            secret_entropy_threshold: 3.7,
            redaction_replacement: "[REDACTED]".to_string(),
        }
    }
}

impl MemoryCapturePolicy {
    /// Apply the policy, returning None when the memory must not be stored.
    pub fn apply(&self, memory: NewMemory) -> Result<Option<NewMemory>, MemoryError> {
        for pattern in &self.deny_patterns {
            let regex = compile(pattern)?;
            if regex.is_match(&memory.content) {
                return Ok(None);
            }
        }

        let mut content = memory.content;
        for pattern in &self.redact_patterns {
            let regex = compile(pattern)?;
            content = regex
                .replace_all(&content, self.redaction_replacement.as_str())
                .to_string();
        }

        if self.detect_secrets {
            content = redact_high_entropy(
                &content,
                self.secret_entropy_threshold,
                self.redaction_replacement.as_str(),
            );
        }

        if let Some(max_chars) = self.max_chars {
            content = truncate_chars(&content, max_chars);
        }

        Ok(Some(NewMemory { content, ..memory }))
    }
}

fn compile(pattern: &str) -> Result<Regex, MemoryError> {
    Regex::new(pattern).map_err(|err| MemoryError::Regex(err.to_string()))
}

/// Truncate a string to a maximum character count.
pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect()
}

/// Redact high-entropy tokens that resemble secrets.
fn redact_high_entropy(content: &str, threshold: f32, replacement: &str) -> String {
    let Ok(regex) = Regex::new(r"[A-Za-z0-9+/=]{20,}") else {
        return content.to_string();
    };
    regex
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let token = caps.get(0).map_or("", |m| m.as_str());
            if shannon_entropy(token) >= threshold {
                replacement.to_string()
            } else {
                token.to_string()
            }
        })
        .to_string()
}

/// Shannon entropy of a token, in bits per byte.
fn shannon_entropy(token: &str) -> f32 {
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for byte in bytes {
        counts[*byte as usize] += 1;
    }
    let len = bytes.len() as f32;
    counts
        .iter()
        .copied()
        .filter(|count| *count > 0)
        .map(|count| {
            let p = count as f32 / len;
            -p * p.log2()
        })
        .sum()
}
