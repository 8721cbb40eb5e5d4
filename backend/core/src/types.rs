use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::employee_id::EmployeeId;

/// The six structured values pulled from a document image.
///
/// Empty string means the field is absent from the document
/// (e.g. passport fields on a national ID card).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub issue_place: String,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default)]
    pub passport_expiry: String,
}

impl ExtractedData {
    /// Field names as sent to and returned by the extraction API.
    pub const FIELD_NAMES: [&'static str; 6] = [
        "fullName",
        "dob",
        "idNumber",
        "issuePlace",
        "passportNumber",
        "passportExpiry",
    ];
}

/// An attached document photo. Bytes and MIME type are forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl ImagePayload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Extension of the file name, without the dot. The whole name when there is no dot.
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or("")
    }
}

/// Everything a backend needs to persist one submission.
///
/// The same request is reused verbatim for the follow-up call of a conflict round-trip.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub employee_id: EmployeeId,
    pub extracted: ExtractedData,
    pub image: ImagePayload,
}

/// Outcome of a successful persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub message: String,
    pub is_update: bool,
}

/// What a backend answers to a save call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Write accepted.
    Saved(SaveResult),
    /// The identifier already has a record; the caller must ask before resending with `update = true`.
    NeedsConfirmation { prompt: String },
}

/// Lifecycle of a single submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let data: ExtractedData =
            serde_json::from_str(r#"{"fullName":"Nguyen Van A","dob":"01/01/1990"}"#).unwrap();
        assert_eq!(data.full_name, "Nguyen Van A");
        assert_eq!(data.passport_number, "");
        assert_eq!(data.passport_expiry, "");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ExtractedData::default()).unwrap();
        for name in ExtractedData::FIELD_NAMES {
            assert_eq!(json[name], "", "field {name}");
        }
    }

    #[test]
    fn image_extension() {
        assert_eq!(ImagePayload::new("card.front.JPG", "image/jpeg", vec![1u8]).extension(), "JPG");
        assert_eq!(ImagePayload::new("capture", "image/png", vec![1u8]).extension(), "capture");
    }
}
