pub mod controller;
pub mod employee_id;
pub mod error;
pub mod traits;
pub mod types;

pub use controller::{save_with_confirmation, FormController, StatusListener};
pub use employee_id::{validate_employee_id, EmployeeId, ID_FORMAT_HINT};
pub use error::{IdCaptureError, EXTRACTION_FAILED_MESSAGE};
pub use traits::{ConfirmationPrompt, DocumentExtractor, FixedAnswer, PersistenceBackend};
pub use types::{ExtractedData, ImagePayload, ProcessState, SaveOutcome, SaveRequest, SaveResult};
