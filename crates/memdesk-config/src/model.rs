//! Configuration schema for memdesk.

use serde::{Deserialize, Serialize};

/// Root config for the support agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemdeskConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl MemdeskConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MemdeskConfigBuilder {
        MemdeskConfigBuilder::new()
    }
}

/// Builder for assembling a `MemdeskConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MemdeskConfigBuilder {
    config: MemdeskConfig,
}

impl MemdeskConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MemdeskConfig::default(),
        }
    }

    /// Replace the completion service configuration.
    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.config.completion = completion;
        self
    }

    /// Replace the memory store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the agent configuration.
    pub fn agent(mut self, agent: AgentConfig) -> Self {
        self.config.agent = agent;
        self
    }

    /// Replace the capture policy configuration.
    pub fn capture(mut self, capture: CaptureConfig) -> Self {
        self.config.capture = capture;
        self
    }

    pub fn build(self) -> MemdeskConfig {
        self.config
    }
}

/// Chat-completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// API credential. Required.
    #[serde(default)]
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model used to answer customer queries.
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used to generate synthetic profiles.
    #[serde(default = "default_profile_model")]
    pub profile_model: String,
    /// Upper bound on generated tokens per answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token cap for profile generation. Unset leaves profiles uncapped so the
    /// JSON is not cut off.
    #[serde(default)]
    pub profile_max_tokens: Option<u32>,
    /// Deadline for a single completion call.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            profile_model: default_profile_model(),
            max_tokens: default_max_tokens(),
            profile_max_tokens: None,
            timeout_seconds: None,
        }
    }
}

fn default_model() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

fn default_profile_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

/// Memory store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Hosted memory service over HTTP.
    #[default]
    Http,
    /// Local JSONL files.
    File,
}

/// Memory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub provider: StoreProvider,
    /// Service endpoint. Required for the http provider.
    #[serde(default)]
    pub url: Option<String>,
    /// Service credential. Required for the http provider.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Root directory. Required for the file provider.
    #[serde(default)]
    pub path: Option<String>,
    /// Number of memories injected as context.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default)]
    pub min_score: Option<f32>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::default(),
            url: None,
            api_key: None,
            path: None,
            search_limit: default_search_limit(),
            min_score: None,
            timeout_seconds: None,
        }
    }
}

fn default_search_limit() -> usize {
    5
}

/// Support agent identity and fallback behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Tag written into every memory's metadata.
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Store name used in the role instruction.
    #[serde(default = "default_store_name")]
    pub store_name: String,
    /// Text returned when a query cannot be answered.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            store_name: default_store_name(),
            fallback_message: default_fallback_message(),
        }
    }
}

fn default_app_id() -> String {
    "customer-support".to_string()
}

fn default_store_name() -> String {
    "TechGadgets.com".to_string()
}

fn default_fallback_message() -> String {
    "Sorry, I encountered an error. Please try again later.".to_string()
}

/// Sanitisation applied to memories before they are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub deny_patterns: Vec<String>,
    #[serde(default)]
    pub redact_patterns: Vec<String>,
    #[serde(default)]
    pub max_chars: Option<usize>,
    #[serde(default)]
    pub detect_secrets: bool,
    #[serde(default = "default_secret_entropy_threshold")]
    pub secret_entropy_threshold: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            deny_patterns: Vec::new(),
            redact_patterns: Vec::new(),
            max_chars: None,
            detect_secrets: false,
            secret_entropy_threshold: default_secret_entropy_threshold(),
        }
    }
}

fn default_secret_entropy_threshold() -> f32 {
    3.7
}
