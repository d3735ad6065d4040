//! Configuration models and layered config loading.
//!
//! This crate owns the memdesk config schema, validation, environment overlay
//! and layer-merging logic used by the SDK and the CLI.

mod env;
mod error;
mod loader;
mod model;

/// Environment variable names read by the overlay.
pub use env::{
    ENV_APP_ID, ENV_BASE_URL, ENV_COMPLETION_API_KEY, ENV_MEMORY_PATH, ENV_MODEL,
    ENV_PROFILE_MODEL, ENV_STORE_API_KEY, ENV_STORE_URL,
};
/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
