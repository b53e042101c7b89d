//! Target dimension resolution
//!
//! Decides, per frame, what size to request from the codec and whether the
//! file should be touched at all.

use std::fmt;
use crate::config::ResizeRequest;

/// Width and height of a frame, native or requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Effective target for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub width: u32,
    pub height: u32,
    /// Set when the smaller-only policy vetoes the resize
    pub skip: bool,
}

impl ResolvedTarget {
    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }
}

/// Why a file was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    WouldNotDecrease,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldNotDecrease => f.write_str("operation would not decrease image size"),
        }
    }
}

/// Verdict for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Dimensions-only mode: report the native size, do not resize
    ReportDimensions(ImageDimensions),
    /// Leave the file untouched
    Skip(SkipReason),
    /// Resize to the given target
    Resize(ImageDimensions),
}

/// Resize policy derived from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionPolicy {
    target_width: u32,
    target_height: u32,
    smaller_only: bool,
    dimensions_only: bool,
}

impl DimensionPolicy {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
            smaller_only: false,
            dimensions_only: false,
        }
    }

    pub fn smaller_only(mut self, enabled: bool) -> Self {
        self.smaller_only = enabled;
        self
    }

    pub fn dimensions_only(mut self, enabled: bool) -> Self {
        self.dimensions_only = enabled;
        self
    }

    pub fn from_request(request: &ResizeRequest) -> Self {
        Self::new(request.target_width, request.target_height)
            .smaller_only(request.smaller_only)
            .dimensions_only(request.dimensions_only)
    }

    /// Decide what to do with a frame of the given native size
    pub fn decide(&self, native: ImageDimensions) -> PolicyDecision {
        if self.dimensions_only {
            return PolicyDecision::ReportDimensions(native);
        }

        let target = self.resolve_target(native);
        if target.skip {
            PolicyDecision::Skip(SkipReason::WouldNotDecrease)
        } else {
            PolicyDecision::Resize(target.dimensions())
        }
    }

    /// Infer a missing dimension from the native aspect ratio and apply the
    /// smaller-only rule.
    ///
    /// Expects at least one non-zero target and a non-empty native size.
    pub fn resolve_target(&self, native: ImageDimensions) -> ResolvedTarget {
        let (width, height) = match (self.target_width, self.target_height) {
            (w, 0) => (w, scale_floor(w, native.height, native.width)),
            (0, h) => (scale_floor(h, native.width, native.height), h),
            (w, h) => (w, h),
        };

        let skip = self.smaller_only && (native.width <= width || native.height <= height);

        ResolvedTarget { width, height, skip }
    }
}

/// `floor(value * numerator / denominator)`, at least 1
fn scale_floor(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(numerator) / u64::from(denominator.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}
