//! Resampling filters and frame resizing

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::processing::ImageDimensions;

/// Available resize filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for image::imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Triangle => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Gaussian => image::imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Resize to exactly `target`; aspect handling is the policy's job
pub fn resize_exact(image: &DynamicImage, target: ImageDimensions, filter: FilterType) -> DynamicImage {
    debug!(
        "Resizing {}x{} -> {} using {:?}",
        image.width(),
        image.height(),
        target,
        filter
    );

    if image.width() == target.width && image.height() == target.height {
        return image.clone();
    }

    image.resize_exact(target.width, target.height, filter.into())
}
