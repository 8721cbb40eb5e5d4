//! Persistence backends for captured identity documents.
//!
//! - [`MockBackend`]: in-process table with simulated latency, for development and tests
//! - [`RemoteBackend`]: the spreadsheet/file-storage script endpoint over HTTP

pub mod mock;
pub mod remote;
pub mod store;
pub mod transliterate;

pub use mock::{DEFAULT_MOCK_LATENCY, MockBackend};
pub use remote::{RemoteBackend, SaveBody, ScriptResponse};
pub use store::{MockStore, StoredRecord, WriteOutcome};
pub use transliterate::{image_file_name, name_without_accents, remove_accents};
