//! Config redaction: produce a safe-to-print config by masking secrets.

use serde_json::Value;

/// Keys whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "token",
    "accessToken",
    "access_token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every sensitive field.
///
/// Script endpoint URLs keep their host but lose the deployment path.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if s.is_empty() {
        return Value::String(String::new());
    }
    if is_sensitive_key(key) {
        // Preserve length hint: show first 4 chars + ***
        let hint = if s.chars().count() > 8 {
            format!("{}***", s.chars().take(4).collect::<String>())
        } else {
            "***".to_string()
        };
        return Value::String(hint);
    }
    if key == "endpointUrl" {
        return Value::String(redact_url_path(s));
    }
    Value::String(s.to_string())
}

fn redact_url_path(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "***".to_string();
    };
    match rest.split_once('/') {
        Some((host, _)) => format!("{scheme}://{host}/***"),
        None => url.to_string(),
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}
