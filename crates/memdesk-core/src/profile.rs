//! Parsing and flattening of generated customer profiles.

use crate::error::ProfileError;
use serde_json::{Map, Value};

/// Parse completion text into a profile object.
///
/// A surrounding Markdown code fence is tolerated. The top level must be a
/// non-empty JSON object.
pub fn parse_profile(text: &str) -> Result<Map<String, Value>, ProfileError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))?;
    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) => Err(ProfileError::WrongShape("empty object".to_string())),
        other => Err(ProfileError::WrongShape(format!(
            "expected an object, got {}",
            kind(&other)
        ))),
    }
}

/// Turn a profile into fact strings, in field order.
///
/// Each list element becomes its own fact (compact JSON); any other field
/// becomes `"{key}: {compact JSON}"`.
pub fn flatten_profile(profile: &Map<String, Value>) -> Vec<String> {
    let mut facts = Vec::new();
    for (key, value) in profile {
        match value {
            Value::Array(items) => facts.extend(items.iter().map(Value::to_string)),
            other => facts.push(format!("{key}: {other}")),
        }
    }
    facts
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with(['{', '[']) => inner.trim(),
        Some(_) => body.trim(),
        None => {
            // Single-line fence: the info string runs straight into the JSON.
            let body = body.trim();
            let rest = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            if body.starts_with(|c: char| c.is_ascii_alphabetic())
                && rest.trim_start().starts_with(['{', '['])
            {
                rest.trim()
            } else {
                body
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{flatten_profile, parse_profile};
    use crate::error::ProfileError;
    use pretty_assertions::assert_eq;

    #[test]
    fn flattens_lists_per_element_and_scalars_per_key() {
        let profile = parse_profile(r#"{"name":"Alice","orders":[{"item":"phone"},{"item":"case"}]}"#)
            .expect("profile");
        assert_eq!(
            flatten_profile(&profile),
            vec![
                "name: \"Alice\"".to_string(),
                "{\"item\":\"phone\"}".to_string(),
                "{\"item\":\"case\"}".to_string(),
            ]
        );
    }

    #[test]
    fn nested_objects_stay_compact() {
        let profile =
            parse_profile(r#"{"recent_order": {"product": {"name": "Laptop"}}}"#).expect("profile");
        assert_eq!(
            flatten_profile(&profile),
            vec!["recent_order: {\"product\":{\"name\":\"Laptop\"}}".to_string()]
        );
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = "```json\n{\"name\": \"Bob\"}\n```";
        let profile = parse_profile(fenced).expect("profile");
        assert_eq!(flatten_profile(&profile), vec!["name: \"Bob\"".to_string()]);

        let bare_fence = "```\n{\"name\": \"Bob\"}\n```";
        assert!(parse_profile(bare_fence).is_ok());

        let one_line = "```json{\"name\":\"Bob\"}```";
        let profile = parse_profile(one_line).expect("single-line fence");
        assert_eq!(flatten_profile(&profile), vec!["name: \"Bob\"".to_string()]);
        assert!(parse_profile("```json {\"name\":\"Bob\"}```").is_ok());
        assert!(parse_profile("```{\"name\":\"Bob\"}```").is_ok());
    }

    #[test]
    fn distinguishes_invalid_json_from_wrong_shape() {
        assert!(matches!(
            parse_profile("Sure! Here is a profile."),
            Err(ProfileError::NotJson(_))
        ));
        assert!(matches!(
            parse_profile("[1, 2]"),
            Err(ProfileError::WrongShape(_))
        ));
        assert!(matches!(parse_profile("{}"), Err(ProfileError::WrongShape(_))));
    }
}
