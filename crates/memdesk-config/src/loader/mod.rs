//! Layered configuration loader.
//!
//! Discovers configuration layers (user, cwd, runtime overrides), validates
//! their schema, merges them, overlays the environment and produces a final
//! validated `MemdeskConfig`.

mod layer_io;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, MemdeskConfig, StoreProvider};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "memdesk.json5";
/// Default config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".memdesk";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: MemdeskConfig,
    /// Metadata for each layer that was loaded.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest file precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Schema validation mode for layered configs.
#[derive(Debug, Clone, Copy)]
enum SchemaMode {
    /// Partial validation for individual layers.
    Partial,
    /// Full validation for the effective config.
    Full,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory searched for `memdesk.json5`.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.memdesk/memdesk.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
    /// Overlay the process environment after merging files.
    pub use_process_env: bool,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            use_process_env: true,
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl MemdeskConfig {
    /// Load a single config from a path (no layering, no env overlay).
    ///
    /// Credentials are not required at this stage; call [`validate`] once
    /// every source has been applied.
    ///
    /// [`validate`]: MemdeskConfig::validate
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering, no env overlay).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, cwd, runtime overrides, environment.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());

        let candidates = [
            (ConfigLayerSource::User, options.user_config_path.clone()),
            (
                ConfigLayerSource::Cwd,
                Some(options.cwd.join(DEFAULT_CONFIG_FILE)),
            ),
        ];
        for (source, path) in candidates {
            if let Some(layer) = layer_io::load_optional_layer(source, path.as_deref())? {
                debug!("loaded {:?} layer", source);
                merge::merge_json_values(&mut merged, &layer.value);
                layers.push(layer.meta);
            }
        }

        for runtime_path in &options.runtime_paths {
            let layer = layer_io::load_required_layer(ConfigLayerSource::Runtime, runtime_path)?;
            debug!("loaded runtime layer (path={})", runtime_path.display());
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        let mut config = config_from_value(merged, "effective")?;
        if options.use_process_env {
            config.apply_process_env();
        }
        config.validate()?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate the complete config, failing fast on missing credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;
        require(&self.completion.api_key, "completion.api_key")?;
        match self.store.provider {
            StoreProvider::Http => {
                require(&self.store.url, "store.url")?;
                require(&self.store.api_key, "store.api_key")?;
            }
            StoreProvider::File => {
                require(&self.store.path, "store.path")?;
            }
        }
        Ok(())
    }

    /// Validate invariants that do not depend on secrets.
    fn validate_settings(&self) -> Result<(), ConfigError> {
        if self.completion.max_tokens == 0 {
            return Err(invalid("completion.max_tokens", "must be greater than zero"));
        }
        if self.completion.profile_max_tokens == Some(0) {
            return Err(invalid(
                "completion.profile_max_tokens",
                "must be greater than zero",
            ));
        }
        if self.completion.model.trim().is_empty() {
            return Err(invalid("completion.model", "must not be empty"));
        }
        if self.agent.app_id.trim().is_empty() {
            return Err(invalid("agent.app_id", "must not be empty"));
        }
        if self.agent.fallback_message.trim().is_empty() {
            return Err(invalid("agent.fallback_message", "must not be empty"));
        }
        if self.store.search_limit == 0 {
            return Err(invalid("store.search_limit", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<MemdeskConfig, ConfigError> {
    schema::validate_layer_schema(&value, SchemaMode::Full, label)?;
    let config: MemdeskConfig = serde_json::from_value(value)?;
    config.validate_settings()?;
    Ok(config)
}

fn require(value: &Option<String>, path: &str) -> Result<(), ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingField {
            path: path.to_string(),
        }),
    }
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
