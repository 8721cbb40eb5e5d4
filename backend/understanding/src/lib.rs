pub mod document;
pub mod vision;

pub use document::{EXTRACTION_PROMPT, GeminiExtractor, RESPONSE_SCHEMA, parse_extraction};
pub use vision::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiClient};
