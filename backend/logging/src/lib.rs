//! Telemetry and structured logging for idcapture.
//!
//! Handles log redaction, console + rolling NDJSON output, and submission event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, SubmissionEvent};
pub use logger::{LOG_FILE_PREFIX, init_console_logger, init_logger};
pub use redact::redact_sensitive_data;
