//! Form controller: validator → extractor → persistence, with the state machine
//! `Idle → Processing → {Success, Error}`.
//!
//! The controller owns the form fields and is the only thing that mutates them.
//! `submit` takes `&mut self`, so a second submission cannot start while one is
//! in flight.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::employee_id::validate_employee_id;
use crate::error::IdCaptureError;
use crate::traits::{ConfirmationPrompt, DocumentExtractor, PersistenceBackend};
use crate::types::{ImagePayload, ProcessState, SaveOutcome, SaveRequest, SaveResult};

pub const INVALID_ID_MESSAGE: &str = "please enter a valid employee ID";
pub const MISSING_IMAGE_MESSAGE: &str = "please select or capture a photo";
pub const ANALYZING_MESSAGE: &str = "analyzing image, please wait...";
pub const SAVING_MESSAGE: &str = "analysis complete, saving data...";
pub const IN_PROGRESS_MESSAGE: &str = "a submission is already in progress";

/// Default delay before a successful form is cleared.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(5);

/// Callback fired on every status/message change.
pub type StatusListener = Arc<dyn Fn(ProcessState, &str) + Send + Sync>;

pub struct FormController {
    extractor: Arc<dyn DocumentExtractor>,
    backend: Arc<dyn PersistenceBackend>,
    prompt: Arc<dyn ConfirmationPrompt>,
    listener: Option<StatusListener>,
    reset_delay: Duration,

    employee_id: String,
    id_error: Option<String>,
    image: Option<ImagePayload>,
    status: ProcessState,
    message: String,
}

impl FormController {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        backend: Arc<dyn PersistenceBackend>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        Self {
            extractor,
            backend,
            prompt,
            listener: None,
            reset_delay: DEFAULT_RESET_DELAY,
            employee_id: String::new(),
            id_error: None,
            image: None,
            status: ProcessState::Idle,
            message: String::new(),
        }
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn with_listener(mut self, listener: StatusListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn status(&self) -> ProcessState {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    pub fn id_error(&self) -> Option<&str> {
        self.id_error.as_deref()
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Update the identifier field, re-validating on every edit.
    pub fn set_employee_id(&mut self, raw: impl Into<String>) {
        self.employee_id = raw.into();
        self.id_error = validate_employee_id(&self.employee_id)
            .err()
            .map(|e| e.to_string());
    }

    /// Attach (or replace) the document photo. Clears any previous outcome.
    pub fn attach_image(&mut self, image: ImagePayload) {
        debug!(file = %image.file_name, mime = %image.mime_type, bytes = image.data.len(), "Image attached");
        self.image = Some(image);
        self.message.clear();
        self.status = ProcessState::Idle;
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        self.status != ProcessState::Processing
            && self.id_error.is_none()
            && !self.employee_id.is_empty()
            && self.image.is_some()
    }

    /// Run one submission. The outcome is reflected in `status()`/`message()` and
    /// also returned so non-UI callers can branch on it.
    ///
    /// Refused while `Processing`, including after an in-flight submission was
    /// dropped; `attach_image` or `reset` returns the form to `Idle`.
    pub async fn submit(&mut self) -> Result<SaveResult, IdCaptureError> {
        if self.status == ProcessState::Processing {
            warn!("Submission refused: another one is in progress");
            return Err(IdCaptureError::validation(IN_PROGRESS_MESSAGE));
        }

        let submission_id = Uuid::new_v4();
        let result = self.run_submission(submission_id).await;

        match &result {
            Ok(saved) => {
                info!(%submission_id, is_update = saved.is_update, "Submission succeeded");
                self.set_status(ProcessState::Success, saved.message.clone());
            }
            Err(e) => {
                warn!(%submission_id, error = %e, "Submission failed");
                self.set_status(ProcessState::Error, e.to_string());
            }
        }
        result
    }

    async fn run_submission(&mut self, submission_id: Uuid) -> Result<SaveResult, IdCaptureError> {
        // Re-validate: the field may have been set without going through the UI.
        let employee_id = match validate_employee_id(&self.employee_id) {
            Ok(id) => {
                self.id_error = None;
                id
            }
            Err(e) => {
                self.id_error = Some(e.to_string());
                return Err(IdCaptureError::validation(INVALID_ID_MESSAGE));
            }
        };
        let image = self
            .image
            .clone()
            .ok_or_else(|| IdCaptureError::validation(MISSING_IMAGE_MESSAGE))?;

        self.set_status(ProcessState::Processing, ANALYZING_MESSAGE);
        info!(%submission_id, employee_id = %employee_id, extractor = self.extractor.name(), "Extracting document fields");
        let extracted = self.extractor.extract(&image).await?;

        self.set_status(ProcessState::Processing, SAVING_MESSAGE);
        let request = SaveRequest {
            employee_id,
            extracted,
            image,
        };
        save_with_confirmation(self.backend.as_ref(), self.prompt.as_ref(), &request).await
    }

    /// Clear every field and return to `Idle`.
    pub fn reset(&mut self) {
        self.employee_id.clear();
        self.id_error = None;
        self.image = None;
        self.set_status(ProcessState::Idle, String::new());
    }

    /// Wait the configured delay, then clear the form. No-op unless in `Success`.
    pub async fn reset_after_success(&mut self) -> bool {
        if self.status != ProcessState::Success {
            return false;
        }
        tokio::time::sleep(self.reset_delay).await;
        self.reset();
        true
    }

    fn set_status(&mut self, status: ProcessState, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
        if let Some(listener) = &self.listener {
            listener(self.status, &self.message);
        }
    }
}

/// Save, and on conflict ask the user before resending the identical request with `update = true`.
///
/// Declining fails with [`IdCaptureError::UserCancelled`] and makes no second call.
pub async fn save_with_confirmation(
    backend: &dyn PersistenceBackend,
    prompt: &dyn ConfirmationPrompt,
    request: &SaveRequest,
) -> Result<SaveResult, IdCaptureError> {
    debug!(backend = backend.name(), employee_id = %request.employee_id, "Saving record");
    let question = match backend.save(request, false).await? {
        SaveOutcome::Saved(result) => return Ok(result),
        SaveOutcome::NeedsConfirmation { prompt: question } => question,
    };

    info!(employee_id = %request.employee_id, "Record already exists; asking for confirmation");
    if !prompt.confirm(&question).await {
        return Err(IdCaptureError::UserCancelled);
    }

    match backend.save(request, true).await? {
        SaveOutcome::Saved(result) => Ok(result),
        SaveOutcome::NeedsConfirmation { prompt: message } => Err(IdCaptureError::Persistence(message)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::traits::FixedAnswer;
    use crate::types::ExtractedData;

    struct StubExtractor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubExtractor {
        fn ok() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail: false })
        }
        fn failing() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail: true })
        }
    }

    #[async_trait]
    impl DocumentExtractor for StubExtractor {
        fn name(&self) -> &str {
            "stub"
        }
        async fn extract(&self, _image: &ImagePayload) -> Result<ExtractedData, IdCaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(IdCaptureError::Extraction);
            }
            Ok(ExtractedData {
                full_name: "Nguyen Van A".into(),
                dob: "01/01/1990".into(),
                id_number: "001090000123".into(),
                issue_place: "Ha Noi".into(),
                ..Default::default()
            })
        }
    }

    /// Never finishes within a test's patience.
    struct SlowExtractor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentExtractor for SlowExtractor {
        fn name(&self) -> &str {
            "slow"
        }
        async fn extract(&self, _image: &ImagePayload) -> Result<ExtractedData, IdCaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ExtractedData::default())
        }
    }

    /// Records every call as `(employee_id, update)`.
    #[derive(Default)]
    struct StubBackend {
        rows: Mutex<HashMap<String, ExtractedData>>,
        calls: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl PersistenceBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }
        async fn save(&self, request: &SaveRequest, update: bool) -> Result<SaveOutcome, IdCaptureError> {
            let key = request.employee_id.to_string();
            self.calls.lock().unwrap().push((key.clone(), update));
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&key) && !update {
                return Ok(SaveOutcome::NeedsConfirmation { prompt: format!("{key} exists") });
            }
            let is_update = rows.insert(key.clone(), request.extracted.clone()).is_some();
            Ok(SaveOutcome::Saved(SaveResult {
                message: format!("saved {key}"),
                is_update,
            }))
        }
    }

    fn image() -> ImagePayload {
        ImagePayload::new("card.jpg", "image/jpeg", vec![0xFFu8, 0xD8, 0xFF])
    }

    fn controller(
        extractor: Arc<StubExtractor>,
        backend: Arc<StubBackend>,
        answer: bool,
    ) -> FormController {
        FormController::new(extractor, backend, Arc::new(FixedAnswer(answer)))
            .with_reset_delay(Duration::from_millis(10))
    }

    #[test]
    fn set_employee_id_revalidates_each_edit() {
        let mut form = controller(StubExtractor::ok(), Arc::default(), true);
        form.set_employee_id("VAE0");
        assert!(form.id_error().is_some());
        form.set_employee_id("vae00076");
        assert!(form.id_error().is_none());
        assert!(!form.can_submit());
        form.attach_image(image());
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn invalid_id_fails_before_extraction() {
        let extractor = StubExtractor::ok();
        let mut form = controller(extractor.clone(), Arc::default(), true);
        form.set_employee_id("EMP00076");
        form.attach_image(image());

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_ID_MESSAGE);
        assert_eq!(form.status(), ProcessState::Error);
        assert!(form.id_error().is_some());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_image_fails_before_any_call() {
        let extractor = StubExtractor::ok();
        let backend = Arc::new(StubBackend::default());
        let mut form = controller(extractor.clone(), backend.clone(), true);
        form.set_employee_id("VAE00076");

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_IMAGE_MESSAGE);
        assert_eq!(form.status(), ProcessState::Error);
        assert_eq!(form.message(), MISSING_IMAGE_MESSAGE);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_surfaces_generic_message() {
        let backend = Arc::new(StubBackend::default());
        let mut form = controller(StubExtractor::failing(), backend.clone(), true);
        form.set_employee_id("VAE00076");
        form.attach_image(image());

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, IdCaptureError::Extraction));
        assert_eq!(form.status(), ProcessState::Error);
        assert_eq!(form.message(), crate::error::EXTRACTION_FAILED_MESSAGE);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn new_record_succeeds_with_single_call() {
        let backend = Arc::new(StubBackend::default());
        let mut form = controller(StubExtractor::ok(), backend.clone(), false);
        form.set_employee_id("vae00076");
        form.attach_image(image());

        let saved = form.submit().await.unwrap();
        assert!(!saved.is_update);
        assert_eq!(form.status(), ProcessState::Success);
        assert_eq!(form.message(), "saved VAE00076");
        assert_eq!(*backend.calls.lock().unwrap(), vec![("VAE00076".to_string(), false)]);
    }

    #[tokio::test]
    async fn declined_conflict_makes_no_second_call() {
        let backend = Arc::new(StubBackend::default());
        backend
            .rows
            .lock()
            .unwrap()
            .insert("VAE00076".into(), ExtractedData::default());
        let mut form = controller(StubExtractor::ok(), backend.clone(), false);
        form.set_employee_id("VAE00076");
        form.attach_image(image());

        let err = form.submit().await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(form.status(), ProcessState::Error);
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
        assert_eq!(backend.rows.lock().unwrap()["VAE00076"], ExtractedData::default());
    }

    #[tokio::test]
    async fn confirmed_conflict_resends_with_update_flag() {
        let backend = Arc::new(StubBackend::default());
        backend
            .rows
            .lock()
            .unwrap()
            .insert("VAE00076".into(), ExtractedData::default());
        let mut form = controller(StubExtractor::ok(), backend.clone(), true);
        form.set_employee_id("VAE00076");
        form.attach_image(image());

        let saved = form.submit().await.unwrap();
        assert!(saved.is_update);
        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec![("VAE00076".to_string(), false), ("VAE00076".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn listener_sees_processing_then_success() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut form = controller(StubExtractor::ok(), Arc::default(), true)
            .with_listener(Arc::new(move |state: ProcessState, _msg: &str| sink.lock().unwrap().push(state)));
        form.set_employee_id("VAE00001");
        form.attach_image(image());
        form.submit().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ProcessState::Processing, ProcessState::Processing, ProcessState::Success]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submission_blocks_the_next_until_reattached() {
        let extractor = Arc::new(SlowExtractor { calls: AtomicUsize::new(0) });
        let backend = Arc::new(StubBackend::default());
        let mut form = FormController::new(extractor.clone(), backend.clone(), Arc::new(FixedAnswer(true)));
        form.set_employee_id("VAE00076");
        form.attach_image(image());

        let timed_out = tokio::time::timeout(Duration::from_millis(20), form.submit()).await;
        assert!(timed_out.is_err());
        assert_eq!(form.status(), ProcessState::Processing);
        assert!(!form.can_submit());

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.to_string(), IN_PROGRESS_MESSAGE);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.status(), ProcessState::Processing);
        assert!(backend.calls.lock().unwrap().is_empty());

        form.attach_image(image());
        assert_eq!(form.status(), ProcessState::Idle);
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn success_resets_after_delay() {
        let mut form = controller(StubExtractor::ok(), Arc::default(), true);
        form.set_employee_id("VAE00002");
        form.attach_image(image());
        form.submit().await.unwrap();

        assert!(form.reset_after_success().await);
        assert_eq!(form.status(), ProcessState::Idle);
        assert!(form.employee_id().is_empty());
        assert!(form.image().is_none());
        assert!(form.message().is_empty());
    }

    #[tokio::test]
    async fn error_state_is_not_auto_reset() {
        let mut form = controller(StubExtractor::ok(), Arc::default(), true);
        form.set_employee_id("VAE00002");
        let _ = form.submit().await;

        assert!(!form.reset_after_success().await);
        assert_eq!(form.status(), ProcessState::Error);
        assert_eq!(form.employee_id(), "VAE00002");
    }
}
