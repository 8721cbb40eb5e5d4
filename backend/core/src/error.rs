use thiserror::Error;

/// Message shown for any extraction failure. The underlying cause is logged, never surfaced.
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "unable to analyze image, please retry with a clearer photo.";

/// Top-level error type for a submission.
///
/// Every variant renders as a single user-facing message; the form controller
/// catches all of them and never lets one propagate further.
#[derive(Debug, Error)]
pub enum IdCaptureError {
    /// Bad identifier or missing image.
    #[error("{0}")]
    Validation(String),

    #[error("{}", EXTRACTION_FAILED_MESSAGE)]
    Extraction,

    /// Failure reported by (or while talking to) the persistence backend.
    #[error("{0}")]
    Persistence(String),

    #[error("user cancelled the update")]
    UserCancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IdCaptureError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the user declined an overwrite.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_error_hides_cause() {
        let err = IdCaptureError::Extraction;
        assert_eq!(err.to_string(), EXTRACTION_FAILED_MESSAGE);
    }

    #[test]
    fn cancelled_message_mentions_user() {
        let err = IdCaptureError::UserCancelled;
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("user cancelled"));
    }
}
