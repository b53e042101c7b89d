//! Input and destination checks

use std::path::Path;
use tracing::debug;

use crate::error::{Result, ResizerError};
use crate::processing::ImageDimensions;

/// Single-file inputs must exist before anything is opened
pub fn ensure_input_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(())
    } else {
        Err(ResizerError::not_found(path))
    }
}

/// Fail when the destination exists and is marked read-only.
///
/// A missing destination passes; the write itself reports anything else.
pub fn ensure_writable<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.permissions().readonly() => Err(ResizerError::permission(
            path,
            "destination file is read-only",
        )),
        Ok(metadata) if metadata.is_dir() => Err(ResizerError::permission(
            path,
            "destination is a directory",
        )),
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Destination {:?} not inspected: {}", path, e);
            Ok(())
        }
    }
}

/// Upper bounds on the size of a resize target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionLimits {
    pub max_dimension: u32,
    pub max_pixels: u64,
}

impl DimensionLimits {
    pub fn new(max_dimension: u32, max_megapixels: u64) -> Self {
        Self {
            max_dimension,
            max_pixels: max_megapixels.saturating_mul(1_000_000),
        }
    }
}

impl Default for DimensionLimits {
    fn default() -> Self {
        Self::new(32768, 500)
    }
}

/// Refuse targets too large to allocate; checked before any frame is resized
pub fn validate_target(target: ImageDimensions, limits: &DimensionLimits, path: &Path) -> Result<()> {
    if target.width > limits.max_dimension || target.height > limits.max_dimension {
        return Err(ResizerError::encode(
            path,
            format!("target size {} exceeds the {} pixel side limit", target, limits.max_dimension),
        ));
    }

    let pixels = u64::from(target.width) * u64::from(target.height);
    if pixels > limits.max_pixels {
        return Err(ResizerError::encode(
            path,
            format!("target size {} exceeds the {} pixel area limit", target, limits.max_pixels),
        ));
    }

    Ok(())
}

/// Decoded frames must have a usable size
pub fn validate_dimensions(dimensions: ImageDimensions, path: &Path) -> Result<()> {
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(ResizerError::decode(
            path,
            format!("image has zero width or height ({})", dimensions),
        ));
    }
    Ok(())
}
