//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes to a literal `${VAR}`.
//! - Deployment overrides: well-known variables (API key, backend URL) win over the file.

use std::collections::HashMap;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{BackendKind, IdCaptureConfig};

/// Matches `${VAR}` and its escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Inference API credential; `API_KEY` is accepted as a fallback.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BACKEND: &str = "IDCAPTURE_BACKEND";
pub const ENV_BACKEND_URL: &str = "IDCAPTURE_BACKEND_URL";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the given environment map.
///
/// Returns an error if any referenced var is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply deployment overrides from a provided map.
pub fn apply_env_overrides_with(
    mut config: IdCaptureConfig,
    env: &HashMap<String, String>,
) -> IdCaptureConfig {
    let non_empty = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(key) = non_empty(ENV_API_KEY).or_else(|| non_empty(ENV_API_KEY_FALLBACK)) {
        debug!("Extraction API key taken from environment");
        config.extraction.api_key = Some(key);
    }
    if let Some(model) = non_empty(ENV_MODEL) {
        config.extraction.model = Some(model);
    }
    if let Some(url) = non_empty(ENV_BACKEND_URL) {
        config.backend.endpoint_url = Some(url);
    }
    if let Some(kind) = non_empty(ENV_BACKEND) {
        match kind.parse::<BackendKind>() {
            Ok(kind) => config.backend.kind = kind,
            Err(e) => warn!(var = ENV_BACKEND, error = %e, "Ignoring invalid backend override"),
        }
    }
    config
}
