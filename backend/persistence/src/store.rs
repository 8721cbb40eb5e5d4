use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use idcapture_core::{EmployeeId, ExtractedData};
use serde::{Deserialize, Serialize};

use crate::transliterate::name_without_accents;

/// One sheet row: the employee's document fields plus the uploaded image name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub employee_id: String,
    pub full_name: String,
    pub full_name_no_accent: String,
    pub dob: String,
    pub id_number: String,
    pub issue_place: String,
    pub passport_number: String,
    pub passport_expiry: String,
    pub image_file_name: String,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn new(employee_id: &EmployeeId, data: &ExtractedData, image_file_name: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            full_name: data.full_name.clone(),
            full_name_no_accent: name_without_accents(&data.full_name),
            dob: data.dob.clone(),
            id_number: data.id_number.clone(),
            issue_place: data.issue_place.clone(),
            passport_number: data.passport_number.clone(),
            passport_expiry: data.passport_expiry.clone(),
            image_file_name: image_file_name.into(),
            updated_at: Utc::now(),
        }
    }

    /// Overwrite only the fields that carry a value in `incoming`.
    pub fn merge_non_empty(&mut self, incoming: &StoredRecord) {
        fn take(dst: &mut String, src: &str) {
            if !src.is_empty() {
                *dst = src.to_string();
            }
        }
        take(&mut self.full_name, &incoming.full_name);
        take(&mut self.full_name_no_accent, &incoming.full_name_no_accent);
        take(&mut self.dob, &incoming.dob);
        take(&mut self.id_number, &incoming.id_number);
        take(&mut self.issue_place, &incoming.issue_place);
        take(&mut self.passport_number, &incoming.passport_number);
        take(&mut self.passport_expiry, &incoming.passport_expiry);
        take(&mut self.image_file_name, &incoming.image_file_name);
        self.updated_at = incoming.updated_at;
    }
}

/// Result of [`MockStore::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Merged,
    /// Key exists and the write did not ask to update; nothing was written.
    Exists,
}

/// In-memory record table keyed by uppercased employee ID.
///
/// Created once and handed to the mock backend at construction. Clones share
/// the same table, so sharing is always an explicit `clone()`.
#[derive(Clone, Default)]
pub struct MockStore {
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the single sample row `VAE99999`.
    pub fn with_sample_record() -> Self {
        let store = Self::new();
        let sample = StoredRecord {
            employee_id: "VAE99999".to_string(),
            full_name: "Nguyễn Văn Mẫu".to_string(),
            full_name_no_accent: "NGUYEN VAN MAU".to_string(),
            dob: String::new(),
            id_number: "001090000001".to_string(),
            issue_place: String::new(),
            passport_number: String::new(),
            passport_expiry: String::new(),
            image_file_name: String::new(),
            updated_at: Utc::now(),
        };
        store
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sample.employee_id.clone(), sample);
        store
    }

    pub fn get(&self, employee_id: &EmployeeId) -> Option<StoredRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(employee_id.as_str())
            .cloned()
    }

    pub fn contains(&self, employee_id: &EmployeeId) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(employee_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new row, or merge into an existing one when `update` is set.
    ///
    /// Existence check and write happen under one lock.
    pub fn write(&self, record: StoredRecord, update: bool) -> WriteOutcome {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        match records.get_mut(&record.employee_id) {
            Some(_) if !update => WriteOutcome::Exists,
            Some(existing) => {
                existing.merge_non_empty(&record);
                WriteOutcome::Merged
            }
            None => {
                records.insert(record.employee_id.clone(), record);
                WriteOutcome::Inserted
            }
        }
    }
}
