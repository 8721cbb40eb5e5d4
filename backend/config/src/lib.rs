//! `idcapture-config` — runtime configuration for the capture pipeline.
//!
//! Provides:
//! - Typed config schema (extraction, backend, form, logging)
//! - YAML loading with a first-run default
//! - `${ENV_VAR}` substitution and deployment env overrides
//! - Default value application
//! - Validation with fail-fast errors
//! - Config redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides_with, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::redact;
pub use schema::{BackendConfig, BackendKind, ExtractionConfig, FormConfig, IdCaptureConfig, LoggingConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Load, apply env substitution and overrides, then defaults.
///
/// This is the main entry point for loading a config at runtime. Validation is
/// left to the caller, which decides whether errors are fatal.
pub async fn load_and_prepare(path: &Path) -> Result<IdCaptureConfig> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

/// [`load_and_prepare`] against an explicit environment (useful for testing).
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<IdCaptureConfig> {
    let raw_config = load_config(path).await?;

    // Serialize to Value for the env substitution pass.
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: IdCaptureConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides_with(config, env);
    Ok(apply_all_defaults(config))
}

/// Log every warning and error of a validation report.
pub fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepare_pipeline_resolves_overrides_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "extraction:\n  apiKey: ${MY_KEY}\nbackend:\n  kind: remote\n",
        )
        .unwrap();
        let env: HashMap<String, String> = [
            ("MY_KEY".to_string(), "AIza-file".to_string()),
            ("IDCAPTURE_BACKEND_URL".to_string(), "https://script.example.com/exec".to_string()),
        ]
        .into_iter()
        .collect();

        let config = load_and_prepare_with(&path, &env).await.unwrap();
        assert_eq!(config.extraction.api_key.as_deref(), Some("AIza-file"));
        assert_eq!(config.extraction.model.as_deref(), Some(defaults::DEFAULT_MODEL));
        assert_eq!(config.backend.kind, BackendKind::Remote);
        assert!(validate(&config).is_valid());
    }

    #[tokio::test]
    async fn unresolved_reference_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "extraction:\n  apiKey: ${UNSET_KEY}\n").unwrap();
        let err = load_and_prepare_with(&path, &HashMap::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("UNSET_KEY"));
    }
}
