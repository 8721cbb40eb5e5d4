//! Mock persistence backend: stands in for the spreadsheet + file-storage service.
//!
//! Simulates network latency, then writes into an owned [`MockStore`].

use std::time::Duration;

use async_trait::async_trait;
use idcapture_core::{IdCaptureError, PersistenceBackend, SaveOutcome, SaveRequest, SaveResult};
use tracing::{debug, info};

use crate::store::{MockStore, StoredRecord, WriteOutcome};
use crate::transliterate::{image_file_name, name_without_accents};

/// Simulated round-trip time of the real backend.
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_secs(2);

pub fn conflict_prompt(employee_id: &str) -> String {
    format!("Employee ID {employee_id} already exists. Do you want to update its information?")
}

pub fn added_message(employee_id: &str) -> String {
    format!("added successfully for {employee_id}")
}

pub fn updated_message(employee_id: &str) -> String {
    format!("updated successfully for {employee_id}")
}

pub struct MockBackend {
    store: MockStore,
    latency: Duration,
}

impl MockBackend {
    pub fn new(store: MockStore) -> Self {
        Self {
            store,
            latency: DEFAULT_MOCK_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl PersistenceBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn save(&self, request: &SaveRequest, update: bool) -> Result<SaveOutcome, IdCaptureError> {
        // One simulated round-trip per save; the confirmed resend is not delayed again.
        if !update && !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let key = request.employee_id.as_str();
        let name_no_accent = name_without_accents(&request.extracted.full_name);
        let file_name = image_file_name(key, &name_no_accent, request.image.extension());
        debug!(employee_id = key, file = %file_name, "(mock) Uploading image");

        let record = StoredRecord::new(&request.employee_id, &request.extracted, file_name);
        match self.store.write(record, update) {
            WriteOutcome::Exists => {
                info!(employee_id = key, "(mock) Employee ID already exists");
                Ok(SaveOutcome::NeedsConfirmation {
                    prompt: conflict_prompt(key),
                })
            }
            WriteOutcome::Merged => {
                info!(employee_id = key, "(mock) Row updated");
                Ok(SaveOutcome::Saved(SaveResult {
                    message: updated_message(key),
                    is_update: true,
                }))
            }
            WriteOutcome::Inserted => {
                info!(employee_id = key, "(mock) Row added");
                Ok(SaveOutcome::Saved(SaveResult {
                    message: added_message(key),
                    is_update: false,
                }))
            }
        }
    }
}
