//! Config validation: checks with user-friendly error messages.
//!
//! Errors here are fatal for `submit`: they are reported before any network call.

use thiserror::Error;

use crate::schema::{BackendKind, IdCaptureConfig};

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&ConfigValidationError> {
        self.errors.first()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &IdCaptureConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_extraction(config, &mut report);
    validate_backend(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://")
}

fn validate_extraction(config: &IdCaptureConfig, report: &mut ValidationReport) {
    let extraction = &config.extraction;
    if is_blank(extraction.api_key.as_ref()) {
        report.error("extraction.apiKey", "extraction API key is not set");
    }
    if let Some(url) = &extraction.base_url {
        if !is_http_url(url) {
            report.error("extraction.baseUrl", "must be an http(s) URL");
        }
    }
}

fn validate_backend(config: &IdCaptureConfig, report: &mut ValidationReport) {
    let backend = &config.backend;
    match backend.kind {
        BackendKind::Remote => match &backend.endpoint_url {
            Some(url) if !url.trim().is_empty() => {
                if !is_http_url(url) {
                    report.error("backend.endpointUrl", "must be an http(s) URL");
                }
            }
            _ => report.error("backend.endpointUrl", "backend URL is not set"),
        },
        BackendKind::Mock => {
            report.warn("backend.kind", "mock backend in use; records are kept in memory only");
            if backend.endpoint_url.is_some() {
                report.warn("backend.endpointUrl", "ignored while the mock backend is active");
            }
        }
    }
}

fn validate_logging(config: &IdCaptureConfig, report: &mut ValidationReport) {
    if let Some(level) = &config.logging.level {
        if !KNOWN_LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.warn("logging.level", format!("unknown level \"{level}\"; filter directives are passed through"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_remote() -> IdCaptureConfig {
        let mut config = IdCaptureConfig::default();
        config.extraction.api_key = Some("AIza-test".into());
        config.backend.kind = BackendKind::Remote;
        config.backend.endpoint_url = Some("https://script.example.com/exec".into());
        config
    }

    #[test]
    fn remote_with_url_and_key_is_valid() {
        let report = validate(&valid_remote());
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn remote_without_url_is_an_error() {
        let mut config = valid_remote();
        config.backend.endpoint_url = Some("   ".into());
        let report = validate(&config);
        let err = report.first_error().unwrap();
        assert_eq!(err.path, "backend.endpointUrl");
        assert_eq!(err.message, "backend URL is not set");
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let mut config = valid_remote();
        config.extraction.api_key = None;
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn mock_backend_only_warns() {
        let mut config = IdCaptureConfig::default();
        config.extraction.api_key = Some("k".into());
        let report = validate(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.path == "backend.kind"));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let mut config = valid_remote();
        config.backend.endpoint_url = Some("ftp://example.com".into());
        assert!(!validate(&config).is_valid());
    }
}
