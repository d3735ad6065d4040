// Builder for the support agent.

use crate::agent::locks::UserLocks;
use crate::agent::{DEFAULT_FALLBACK_MESSAGE, SupportAgent};
use autoagents_llm::LLMProvider;
use log::warn;
use memdesk_config::{AgentConfig, CaptureConfig, MemdeskConfig};
use memdesk_memory::{MemoryCapturePolicy, MemoryStore, SearchOptions};
use std::sync::Arc;
use std::time::Duration;

/// Assembles a [`SupportAgent`] from its store, completion provider and settings.
#[derive(Clone)]
pub struct SupportAgentBuilder {
    store: Arc<dyn MemoryStore>,
    llm: Arc<dyn LLMProvider>,
    profile_llm: Option<Arc<dyn LLMProvider>>,
    app_id: String,
    store_name: String,
    fallback_message: String,
    search_options: SearchOptions,
    capture_policy: MemoryCapturePolicy,
    completion_timeout: Option<Duration>,
}

impl std::fmt::Debug for SupportAgentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportAgentBuilder")
            .field("app_id", &self.app_id)
            .field("store_name", &self.store_name)
            .field("search_options", &self.search_options)
            .field("has_profile_llm", &self.profile_llm.is_some())
            .finish()
    }
}

impl SupportAgentBuilder {
    /// Start from default agent settings.
    pub fn new(store: Arc<dyn MemoryStore>, llm: Arc<dyn LLMProvider>) -> Self {
        let agent = AgentConfig::default();
        Self {
            store,
            llm,
            profile_llm: None,
            app_id: agent.app_id,
            store_name: agent.store_name,
            fallback_message: agent.fallback_message,
            search_options: SearchOptions::default(),
            capture_policy: MemoryCapturePolicy::default(),
            completion_timeout: None,
        }
    }

    /// Start from a loaded config. Providers are built by the caller because
    /// they own the credentials and model binding.
    pub fn from_config(
        config: &MemdeskConfig,
        store: Arc<dyn MemoryStore>,
        llm: Arc<dyn LLMProvider>,
    ) -> Self {
        Self::new(store, llm)
            .app_id(config.agent.app_id.clone())
            .store_name(config.agent.store_name.clone())
            .fallback_message(config.agent.fallback_message.clone())
            .search_options(SearchOptions {
                limit: config.store.search_limit,
                min_score: config.store.min_score,
            })
            .capture_policy(capture_policy_from_config(&config.capture))
            .completion_timeout(config.completion.timeout_seconds.map(Duration::from_secs))
    }

    /// Provider used for profile generation. Defaults to the answer provider.
    pub fn profile_llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.profile_llm = Some(llm);
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = store_name.into();
        self
    }

    pub fn fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    pub fn capture_policy(mut self, policy: MemoryCapturePolicy) -> Self {
        self.capture_policy = policy;
        self
    }

    /// Deadline for each completion call.
    pub fn completion_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.completion_timeout = timeout;
        self
    }

    pub fn build(self) -> SupportAgent {
        let fallback_message = if self.fallback_message.trim().is_empty() {
            warn!("blank fallback message replaced with the default");
            DEFAULT_FALLBACK_MESSAGE.to_string()
        } else {
            self.fallback_message
        };
        SupportAgent {
            profile_llm: self.profile_llm.unwrap_or_else(|| self.llm.clone()),
            store: self.store,
            llm: self.llm,
            app_id: self.app_id,
            store_name: self.store_name,
            fallback_message,
            search_options: self.search_options,
            capture_policy: self.capture_policy,
            completion_timeout: self.completion_timeout,
            locks: UserLocks::default(),
        }
    }
}

/// Translate capture settings from config into the store policy.
pub(crate) fn capture_policy_from_config(config: &CaptureConfig) -> MemoryCapturePolicy {
    MemoryCapturePolicy {
        deny_patterns: config.deny_patterns.clone(),
        redact_patterns: config.redact_patterns.clone(),
        max_chars: config.max_chars,
        detect_secrets: config.detect_secrets,
        secret_entropy_threshold: config.secret_entropy_threshold,
        redaction_replacement: "[REDACTED]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{SupportAgentBuilder, capture_policy_from_config};
    use memdesk_config::{CaptureConfig, MemdeskConfig};
    use memdesk_test_utils::{FixedLLM, RecordingStore};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn from_config_carries_agent_settings() {
        let config = MemdeskConfig::load_from_str(
            r#"{
                completion: { timeout_seconds: 7 },
                store: { search_limit: 3, min_score: 0.5 },
                agent: { app_id: "returns-desk", store_name: "Acme" },
            }"#,
        )
        .expect("config");
        let agent = SupportAgentBuilder::from_config(
            &config,
            Arc::new(RecordingStore::new()),
            Arc::new(FixedLLM::new("ok")),
        )
        .build();

        assert_eq!(agent.app_id(), "returns-desk");
        assert_eq!(agent.store_name, "Acme");
        assert_eq!(agent.search_options.limit, 3);
        assert_eq!(agent.search_options.min_score, Some(0.5));
        assert_eq!(agent.completion_timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn blank_fallback_uses_default() {
        let agent = SupportAgentBuilder::new(
            Arc::new(RecordingStore::new()),
            Arc::new(FixedLLM::new("ok")),
        )
        .fallback_message("  ")
        .build();
        assert_eq!(
            agent.fallback_message,
            "Sorry, I encountered an error. Please try again later."
        );
    }

    #[test]
    fn capture_config_maps_to_policy() {
        let policy = capture_policy_from_config(&CaptureConfig {
            deny_patterns: vec!["password".to_string()],
            max_chars: Some(10),
            ..CaptureConfig::default()
        });
        assert_eq!(policy.deny_patterns, vec!["password".to_string()]);
        assert_eq!(policy.max_chars, Some(10));
        assert!(!policy.detect_secrets);
        assert_eq!(policy.redaction_replacement, "[REDACTED]");
    }
}
