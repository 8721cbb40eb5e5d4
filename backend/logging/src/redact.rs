//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, citizen ID numbers and inline image data
//! from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(AIza[0-9A-Za-z\-_]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static KEY_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([?&]key=)[^&\s]+").unwrap());
static ID_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{12}\b").unwrap());
static BASE64_BLOB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9+/]{200,}={0,2}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Inline image payloads first, so the other patterns don't scan megabytes of base64.
    let redacted = BASE64_BLOB_RE.replace_all(input, |caps: &regex::Captures| {
        format!("[REDACTED_BASE64 {} chars]", caps[0].len())
    });

    let redacted = KEY_PARAM_RE.replace_all(&redacted, "${1}[REDACTED_KEY]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    let redacted = ID_NUMBER_RE.replace_all(&redacted, "[REDACTED_ID_NUMBER]");

    redacted.into_owned()
}
