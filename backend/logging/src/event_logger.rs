//! Submission Event Logger
//!
//! Structured audit events for each submission, emitted through `tracing` so
//! they land in the rolling NDJSON log alongside everything else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmissionEvent {
    Started {
        employee_id: String,
        file_name: String,
        mime_type: String,
    },
    StatusChanged {
        status: String,
        message: String,
    },
    Completed {
        is_update: bool,
        message: String,
    },
    Failed {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub submission_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SubmissionEvent,
}

impl EventLogEntry {
    /// Build an entry with every free-text field redacted.
    pub fn new(submission_id: &str, mut event: SubmissionEvent) -> Self {
        match &mut event {
            SubmissionEvent::StatusChanged { message, .. }
            | SubmissionEvent::Completed { message, .. } => {
                *message = redact_sensitive_data(message);
            }
            SubmissionEvent::Failed { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            SubmissionEvent::Started { .. } => {}
        }

        Self {
            submission_id: submission_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Logs a submission event, serializing it as one JSON field.
    pub fn log_event(submission_id: &str, event: SubmissionEvent) {
        let entry = EventLogEntry::new(submission_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "submission_events", event = %json, "Submission event");
    }
}
