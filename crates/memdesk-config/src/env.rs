//! Environment overlay for secrets and endpoints.

use crate::MemdeskConfig;
use log::debug;

pub const ENV_COMPLETION_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "MEMDESK_MODEL";
pub const ENV_PROFILE_MODEL: &str = "MEMDESK_PROFILE_MODEL";
pub const ENV_STORE_URL: &str = "MEMDESK_STORE_URL";
pub const ENV_STORE_API_KEY: &str = "MEMDESK_STORE_API_KEY";
pub const ENV_MEMORY_PATH: &str = "MEMDESK_MEMORY_PATH";
pub const ENV_APP_ID: &str = "MEMDESK_APP_ID";

impl MemdeskConfig {
    /// Overlay values from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    /// Overlay values from an environment lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get(ENV_COMPLETION_API_KEY) {
            self.completion.api_key = Some(value);
        }
        if let Some(value) = get(ENV_BASE_URL) {
            self.completion.base_url = Some(value);
        }
        if let Some(value) = get(ENV_MODEL) {
            self.completion.model = value;
        }
        if let Some(value) = get(ENV_PROFILE_MODEL) {
            self.completion.profile_model = value;
        }
        if let Some(value) = get(ENV_STORE_URL) {
            self.store.url = Some(value);
        }
        if let Some(value) = get(ENV_STORE_API_KEY) {
            self.store.api_key = Some(value);
        }
        if let Some(value) = get(ENV_MEMORY_PATH) {
            self.store.path = Some(value);
        }
        if let Some(value) = get(ENV_APP_ID) {
            self.agent.app_id = value;
        }
        debug!(
            "applied env overlay (completion_key_set={}, store_url_set={}, store_key_set={})",
            self.completion.api_key.is_some(),
            self.store.url.is_some(),
            self.store.api_key.is_some()
        );
    }

    /// Build a config from defaults plus the process environment, then validate.
    pub fn from_env() -> Result<Self, crate::ConfigError> {
        let mut config = Self::default();
        config.apply_process_env();
        config.validate()?;
        Ok(config)
    }
}
