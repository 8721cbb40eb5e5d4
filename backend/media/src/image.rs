//! Image capture: read a document photo from disk into an [`ImagePayload`].

use std::path::Path;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use idcapture_core::ImagePayload;
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::{detect_mime_type, sniff_mime_type};

/// Read an image file. The bytes are kept as-is; only the MIME type is derived.
///
/// The extension decides the MIME type. Files whose extension is not PNG/JPEG
/// (e.g. camera captures saved without one) are accepted if their content is.
pub async fn load_image(path: &Path) -> Result<ImagePayload> {
    let data = fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    if data.is_empty() {
        bail!("Image file is empty: {}", path.display());
    }

    let mime_type = match (detect_mime_type(path), sniff_mime_type(&data)) {
        (Some(by_ext), Some(by_content)) if by_ext != by_content => {
            warn!(path = %path.display(), by_ext, by_content, "Image extension does not match content");
            by_ext
        }
        (Some(by_ext), _) => by_ext,
        (None, Some(by_content)) => by_content,
        (None, None) => bail!(
            "Unsupported image type: {} (only PNG and JPEG are accepted)",
            path.display()
        ),
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    debug!(file = %file_name, mime = mime_type, bytes = data.len(), "Loaded image");
    Ok(ImagePayload::new(file_name, mime_type, Bytes::from(data)))
}
