//! Tests for configuration loading and validation.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

fn isolated_options(root: &Path) -> LayeredConfigOptions {
    LayeredConfigOptions {
        cwd: root.join("cwd"),
        user_config_path: Some(root.join("home").join(DEFAULT_CONFIG_FILE)),
        runtime_paths: Vec::new(),
        use_process_env: false,
    }
}

/// A minimal config parses with defaults but is not yet complete.
#[test]
fn parse_minimal_config() {
    let config = MemdeskConfig::load_from_str("{}").expect("config");
    assert_eq!(config.completion.max_tokens, 500);
    assert_eq!(config.agent.app_id, "customer-support");
    assert_eq!(config.store.provider, StoreProvider::Http);
    assert_eq!(
        config.agent.fallback_message,
        "Sorry, I encountered an error. Please try again later."
    );

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { ref path } if path == "completion.api_key"));
}

/// Reject unexpected keys at any depth.
#[test]
fn rejects_unknown_keys() {
    let err = MemdeskConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    assert!(format!("{err}").contains("unknown key"));

    let err = MemdeskConfig::load_from_str(r#"{ store: { endpoint: "x" } }"#).unwrap_err();
    assert!(format!("{err}").contains("store.endpoint"));
}

/// Reject invalid enum values and wrong types.
#[test]
fn rejects_invalid_values() {
    let err = MemdeskConfig::load_from_str(r#"{ store: { provider: "qdrant" } }"#).unwrap_err();
    assert!(format!("{err}").contains("store.provider"));

    let err = MemdeskConfig::load_from_str(r#"{ completion: { max_tokens: "many" } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("completion.max_tokens"));

    let err = MemdeskConfig::load_from_str(r#"{ completion: { max_tokens: 0 } }"#).unwrap_err();
    assert!(format!("{err}").contains("completion.max_tokens"));
}

/// The http store needs both an endpoint and a credential.
#[test]
fn http_store_requires_endpoint_and_credential() {
    let config = MemdeskConfig::load_from_str(
        r#"{ completion: { api_key: "sk" }, store: { url: "https://mem.example" } }"#,
    )
    .expect("config");
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { ref path } if path == "store.api_key"));

    let config = MemdeskConfig::load_from_str(
        r#"{ completion: { api_key: "sk" }, store: { url: "https://mem.example", api_key: "m0" } }"#,
    )
    .expect("config");
    config.validate().expect("valid");
}

/// The file store needs a path but no remote credentials.
#[test]
fn file_store_requires_path_only() {
    let config = MemdeskConfig::load_from_str(
        r#"{ completion: { api_key: "sk" }, store: { provider: "file" } }"#,
    )
    .expect("config");
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { ref path } if path == "store.path"));

    let config = MemdeskConfig::load_from_str(
        r#"{ completion: { api_key: "sk" }, store: { provider: "file", path: "/tmp/mem" } }"#,
    )
    .expect("config");
    config.validate().expect("valid");
}

/// Runtime overrides win over cwd, which wins over the user layer.
#[test]
fn layered_config_applies_precedence() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let options = isolated_options(root);
    fs::create_dir_all(&options.cwd).expect("cwd");

    write_json5(
        options.user_config_path.as_ref().expect("user path"),
        r#"{
            completion: { api_key: "sk-user", model: "user-model" },
            store: { provider: "file", path: "/user/mem" },
            agent: { store_name: "UserStore" },
        }"#,
    );
    write_json5(
        &options.cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ completion: { model: "cwd-model" }, store: { path: "/cwd/mem" } }"#,
    );
    let runtime = root.join("runtime.json5");
    write_json5(&runtime, r#"{ store: { path: "/runtime/mem" } }"#);

    let layered =
        MemdeskConfig::load_layered_with_options(options.with_runtime_path(&runtime))
            .expect("layered");

    assert_eq!(layered.layers.len(), 3);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::User);
    assert_eq!(layered.layers[2].source, ConfigLayerSource::Runtime);
    assert_eq!(layered.config.completion.api_key.as_deref(), Some("sk-user"));
    assert_eq!(layered.config.completion.model, "cwd-model");
    assert_eq!(layered.config.store.path.as_deref(), Some("/runtime/mem"));
    assert_eq!(layered.config.agent.store_name, "UserStore");
}

/// Missing optional layers are skipped; a missing runtime layer is an error.
#[test]
fn layered_config_requires_runtime_paths_to_exist() {
    let temp = TempDir::new().expect("tmp");
    let options = isolated_options(temp.path()).with_runtime_path(temp.path().join("nope.json5"));
    let err = MemdeskConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

/// With no layers and no env, the effective config fails fast.
#[test]
fn layered_config_fails_fast_without_credentials() {
    let temp = TempDir::new().expect("tmp");
    let err = MemdeskConfig::load_layered_with_options(isolated_options(temp.path()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { .. }));
}

/// Profile generation is uncapped unless a separate cap is configured.
#[test]
fn profile_token_cap_is_separate_from_answers() {
    let config = MemdeskConfig::load_from_str("{}").expect("config");
    assert_eq!(config.completion.profile_max_tokens, None);

    let config = MemdeskConfig::load_from_str(
        r#"{ completion: { max_tokens: 200, profile_max_tokens: 2000 } }"#,
    )
    .expect("config");
    assert_eq!(config.completion.max_tokens, 200);
    assert_eq!(config.completion.profile_max_tokens, Some(2000));

    let err = MemdeskConfig::load_from_str(r#"{ completion: { profile_max_tokens: 0 } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("completion.profile_max_tokens"));
}
