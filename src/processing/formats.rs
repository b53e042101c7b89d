//! Image format selection

use std::path::Path;
use image::ImageFormat;

/// Format to encode `path` with: its extension, else the source format
pub fn output_format<P: AsRef<Path>>(path: P, source: ImageFormat) -> ImageFormat {
    ImageFormat::from_path(path).unwrap_or(source)
}

/// Formats decoded frame by frame and re-encoded as animations
pub fn supports_animation(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Gif)
}

/// Formats that cannot store an alpha channel
pub fn requires_rgb(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg)
}
