//! Image file discovery and header probing

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::ImageSize;

pub mod scanner;

pub use scanner::{ImageScanner, ScanStats, DEFAULT_IMAGE_EXTENSIONS};

/// Read an image's dimensions from its header without decoding pixel data.
pub fn probe_dimensions(path: &Path) -> Result<ImageSize> {
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("Failed to read image header: {}", path.display()))?;
    ImageSize::new(height, width).with_context(|| format!("Unusable image: {}", path.display()))
}
