//! Config defaults: applies default values to a parsed config.

use crate::schema::IdCaptureConfig;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Simulated latency of the mock backend.
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 2_000;

/// Delay before a successful form is cleared.
pub const DEFAULT_RESET_DELAY_SECS: u64 = 5;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: IdCaptureConfig) -> IdCaptureConfig {
    let config = apply_extraction_defaults(config);
    let config = apply_backend_defaults(config);
    let config = apply_form_defaults(config);
    apply_logging_defaults(config)
}

fn apply_extraction_defaults(mut config: IdCaptureConfig) -> IdCaptureConfig {
    let extraction = &mut config.extraction;
    extraction.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    extraction.base_url.get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    config
}

fn apply_backend_defaults(mut config: IdCaptureConfig) -> IdCaptureConfig {
    config.backend.mock_latency_ms.get_or_insert(DEFAULT_MOCK_LATENCY_MS);
    config.backend.seed_sample_record.get_or_insert(true);
    config
}

fn apply_form_defaults(mut config: IdCaptureConfig) -> IdCaptureConfig {
    config.form.reset_delay_secs.get_or_insert(DEFAULT_RESET_DELAY_SECS);
    config
}

fn apply_logging_defaults(mut config: IdCaptureConfig) -> IdCaptureConfig {
    let logging = &mut config.logging;
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_gap() {
        let config = apply_all_defaults(IdCaptureConfig::default());
        assert_eq!(config.extraction.model.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(config.backend.mock_latency_ms, Some(DEFAULT_MOCK_LATENCY_MS));
        assert_eq!(config.backend.seed_sample_record, Some(true));
        assert_eq!(config.form.reset_delay_secs, Some(5));
        assert_eq!(config.logging.level.as_deref(), Some("info"));
        assert!(config.extraction.api_key.is_none());
    }

    #[test]
    fn keeps_explicit_values() {
        let mut config = IdCaptureConfig::default();
        config.backend.mock_latency_ms = Some(0);
        config.form.reset_delay_secs = Some(1);
        let config = apply_all_defaults(config);
        assert_eq!(config.backend.mock_latency_ms, Some(0));
        assert_eq!(config.form.reset_delay_secs, Some(1));
    }
}
