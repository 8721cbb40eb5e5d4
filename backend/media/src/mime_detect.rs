//! MIME type detection for document photos.
//!
//! The capture surface only accepts PNG and JPEG; anything else is rejected
//! rather than transcoded.

use std::path::Path;

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Detect MIME type by file extension. `None` for anything but PNG/JPEG.
pub fn detect_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Some(MIME_JPEG),
        "png"          => Some(MIME_PNG),
        _              => None,
    }
}

/// Detect MIME type from the leading bytes.
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(PNG_MAGIC) {
        Some(MIME_PNG)
    } else if data.starts_with(JPEG_MAGIC) {
        Some(MIME_JPEG)
    } else {
        None
    }
}
