//! Image capture for document photos: file loading and PNG/JPEG detection.

pub mod image;
pub mod mime_detect;

pub use image::load_image;
pub use mime_detect::{detect_mime_type, sniff_mime_type, MIME_JPEG, MIME_PNG};
