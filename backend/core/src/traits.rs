use async_trait::async_trait;

use crate::error::IdCaptureError;
use crate::types::{ExtractedData, ImagePayload, SaveOutcome, SaveRequest};

/// Turns a document photo into structured fields via an external vision model.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// One at-most-once call; failures collapse into [`IdCaptureError::Extraction`].
    async fn extract(&self, image: &ImagePayload) -> Result<ExtractedData, IdCaptureError>;
}

/// Persists a submission to a record store (mock table or remote script endpoint).
///
/// Implementations never prompt. A save without `update` against an existing
/// record answers [`SaveOutcome::NeedsConfirmation`] and writes nothing.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Backend name (e.g., "mock", "remote").
    fn name(&self) -> &str;

    async fn save(&self, request: &SaveRequest, update: bool) -> Result<SaveOutcome, IdCaptureError>;
}

/// A blocking yes/no question put to the user before overwriting a record.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Prompt with a fixed answer, for non-interactive runs.
pub struct FixedAnswer(pub bool);

#[async_trait]
impl ConfirmationPrompt for FixedAnswer {
    async fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}
