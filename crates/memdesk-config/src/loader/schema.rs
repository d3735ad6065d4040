//! Schema validation helpers for memdesk JSON5 configuration.

use super::SchemaMode;
use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(
    value: &Value,
    _mode: SchemaMode,
    layer: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = ["$schema", "completion", "store", "agent", "capture"];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("completion") {
        validate_completion(value, layer, "completion")?;
    }
    if let Some(value) = map.get("store") {
        validate_store(value, layer, "store")?;
    }
    if let Some(value) = map.get("agent") {
        validate_agent(value, layer, "agent")?;
    }
    if let Some(value) = map.get("capture") {
        validate_capture(value, layer, "capture")?;
    }

    Ok(())
}

/// Validate the "completion" block.
fn validate_completion(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "api_key",
        "base_url",
        "model",
        "profile_model",
        "max_tokens",
        "profile_max_tokens",
        "timeout_seconds",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    for key in ["api_key", "base_url", "model", "profile_model"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["max_tokens", "profile_max_tokens", "timeout_seconds"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "store" block.
fn validate_store(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "provider",
        "url",
        "api_key",
        "path",
        "search_limit",
        "min_score",
        "timeout_seconds",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("provider") {
        validate_store_provider(value, layer, &join_path(path, "provider"))?;
    }
    for key in ["url", "api_key", "path"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["search_limit", "timeout_seconds"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("min_score") {
        expect_f64(value, layer, &join_path(path, "min_score"))?;
    }
    Ok(())
}

fn validate_store_provider(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Some(provider) = value.as_str() else {
        return Err(invalid_field(layer, path, "expected string"));
    };
    if matches!(provider, "http" | "file") {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "invalid store provider"))
    }
}

/// Validate the "agent" block.
fn validate_agent(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["app_id", "store_name", "fallback_message"];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    for key in allowed {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "capture" block.
fn validate_capture(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "deny_patterns",
        "redact_patterns",
        "max_chars",
        "detect_secrets",
        "secret_entropy_threshold",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("deny_patterns") {
        validate_string_array(value, layer, &join_path(path, "deny_patterns"))?;
    }
    if let Some(value) = map.get("redact_patterns") {
        validate_string_array(value, layer, &join_path(path, "redact_patterns"))?;
    }
    if let Some(value) = map.get("max_chars") {
        expect_u64(value, layer, &join_path(path, "max_chars"))?;
    }
    if let Some(value) = map.get("detect_secrets") {
        expect_bool(value, layer, &join_path(path, "detect_secrets"))?;
    }
    if let Some(value) = map.get("secret_entropy_threshold") {
        expect_f64(value, layer, &join_path(path, "secret_entropy_threshold"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if matches!(value, Value::Bool(_)) {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() || value.is_i64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected integer"))
    }
}

/// Expect a JSON number or return a typed error.
fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Validate that a value is an array of strings.
fn validate_string_array(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Value::Array(arr) = value else {
        return Err(invalid_field(layer, path, "expected array"));
    };
    for (idx, entry) in arr.iter().enumerate() {
        if entry.as_str().is_none() {
            return Err(invalid_field(
                layer,
                &format!("{path}[{idx}]"),
                "expected string",
            ));
        }
    }
    Ok(())
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
