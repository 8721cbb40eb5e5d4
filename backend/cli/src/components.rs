//! Builds the extractor, backend, and form controller from the effective config.

use std::sync::Arc;
use std::time::Duration;

use idcapture_config::defaults::{DEFAULT_MOCK_LATENCY_MS, DEFAULT_RESET_DELAY_SECS};
use idcapture_config::{log_report, validate, BackendKind, IdCaptureConfig};
use idcapture_core::{
    ConfirmationPrompt, DocumentExtractor, FixedAnswer, FormController, IdCaptureError,
    PersistenceBackend, StatusListener,
};
use idcapture_persistence::{MockBackend, MockStore, RemoteBackend};
use idcapture_understanding::{GeminiClient, GeminiExtractor};
use tracing::info;

use crate::prompt::TerminalPrompt;

/// How conflicts are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    Ask,
    Always,
    Never,
}

impl OverwritePolicy {
    pub fn from_flags(yes: bool, no_overwrite: bool) -> Self {
        match (yes, no_overwrite) {
            (true, _) => Self::Always,
            (_, true) => Self::Never,
            _ => Self::Ask,
        }
    }

    pub fn prompt(self) -> Arc<dyn ConfirmationPrompt> {
        match self {
            Self::Ask => Arc::new(TerminalPrompt),
            Self::Always => Arc::new(FixedAnswer(true)),
            Self::Never => Arc::new(FixedAnswer(false)),
        }
    }
}

/// Validate before anything touches the network; the first error is fatal.
pub fn ensure_valid(config: &IdCaptureConfig) -> Result<(), IdCaptureError> {
    let report = validate(config);
    log_report(&report);
    match report.first_error() {
        Some(err) => Err(IdCaptureError::config(err.message.clone())),
        None => Ok(()),
    }
}

pub fn build_extractor(config: &IdCaptureConfig) -> Arc<dyn DocumentExtractor> {
    let extraction = &config.extraction;
    let mut client = GeminiClient::new(extraction.api_key.clone().unwrap_or_default());
    if let Some(model) = &extraction.model {
        client = client.with_model(model.clone());
    }
    if let Some(base_url) = &extraction.base_url {
        client = client.with_base_url(base_url.clone());
    }
    Arc::new(GeminiExtractor::new(client))
}

pub fn build_backend(config: &IdCaptureConfig) -> Arc<dyn PersistenceBackend> {
    let backend = &config.backend;
    match backend.kind {
        BackendKind::Mock => {
            let store = if backend.seed_sample_record.unwrap_or(true) {
                MockStore::with_sample_record()
            } else {
                MockStore::new()
            };
            let latency =
                Duration::from_millis(backend.mock_latency_ms.unwrap_or(DEFAULT_MOCK_LATENCY_MS));
            info!(latency_ms = latency.as_millis() as u64, records = store.len(), "Using mock backend");
            Arc::new(MockBackend::new(store).with_latency(latency))
        }
        BackendKind::Remote => {
            let url = backend.endpoint_url.clone().unwrap_or_default();
            info!("Using remote backend");
            Arc::new(RemoteBackend::new(url))
        }
    }
}

pub fn build_form(
    config: &IdCaptureConfig,
    policy: OverwritePolicy,
    listener: StatusListener,
) -> FormController {
    let reset_delay =
        Duration::from_secs(config.form.reset_delay_secs.unwrap_or(DEFAULT_RESET_DELAY_SECS));
    FormController::new(build_extractor(config), build_backend(config), policy.prompt())
        .with_reset_delay(reset_delay)
        .with_listener(listener)
}
