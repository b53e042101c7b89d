//! Core image processing functionality

use std::path::Path;
use tracing::debug;

use crate::config::ProcessingConfig;
use crate::error::{ErrorContext, Result, ResizerError};

pub mod codec;
pub mod formats;
pub mod policy;
pub mod resize;
pub mod validation;

pub use codec::*;
pub use policy::*;
pub use resize::FilterType;
pub use validation::*;

/// What happened to a file that was processed without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Every frame was resized and the result written
    Resized {
        from: ImageDimensions,
        to: ImageDimensions,
        frames: usize,
    },
    /// Dimensions-only mode: nothing written
    DimensionsReported(ImageDimensions),
    /// Policy vetoed the resize: nothing written
    Skipped(SkipReason),
}

/// Runs one file through open, coalesce, policy, resize and write
pub struct ProcessingEngine<C = ImageCrateCodec> {
    codec: C,
    limits: DimensionLimits,
}

impl ProcessingEngine {
    /// Create a new processing engine with the default codec
    pub fn new() -> Self {
        Self::with_codec(ImageCrateCodec::default())
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::with_codec(ImageCrateCodec::from_config(config)).with_limits(config.limits())
    }
}

impl Default for ProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> ProcessingEngine<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            limits: DimensionLimits::default(),
        }
    }

    /// Bound the size of every resize target
    pub fn with_limits(mut self, limits: DimensionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Process a single file.
    ///
    /// The first frame whose verdict is a report or a skip ends processing
    /// without writing, so the file stays byte-identical.
    pub fn process_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        policy: &DimensionPolicy,
    ) -> Result<FileOutcome> {
        debug!("Processing file: {:?} -> {:?}", input_path, output_path);

        let mut collection = self.codec.open(input_path)?;
        self.codec.coalesce(&mut collection);

        let original = collection
            .frames()
            .first()
            .map(ImageFrame::dimensions)
            .ok_or_else(|| ResizerError::decode(input_path, "image contains no frames"))?;

        let mut resized_to = None;
        for frame in collection.frames_mut() {
            let native = frame.dimensions();
            validate_dimensions(native, input_path)?;

            match policy.decide(native) {
                PolicyDecision::ReportDimensions(dimensions) => {
                    return Ok(FileOutcome::DimensionsReported(dimensions));
                }
                PolicyDecision::Skip(reason) => {
                    debug!("Skipping {:?}: {}", input_path, reason);
                    return Ok(FileOutcome::Skipped(reason));
                }
                PolicyDecision::Resize(target) => {
                    validate_target(target, &self.limits, output_path)?;
                    self.codec.resize_frame(frame, target);
                    resized_to.get_or_insert(target);
                }
            }
        }

        ensure_writable(output_path)?;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).encode_context(output_path)?;
        }
        self.codec.write(&collection, output_path)?;

        let to = resized_to.unwrap_or(original);
        debug!("Resized {:?}: {} -> {} ({} frames)", input_path, original, to, collection.len());

        Ok(FileOutcome::Resized {
            from: original,
            to,
            frames: collection.len(),
        })
    }
}
