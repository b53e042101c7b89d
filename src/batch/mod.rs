//! Batch dispatch over resolved input files
//!
//! Every file is processed on its own; a failure becomes that file's
//! [`BatchOutcome`] and the batch moves on.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ResizeRequest;
use crate::error::{Result, ResizerError};
use crate::processing::{
    DimensionPolicy, FileOutcome, ImageCodec, ImageCrateCodec, ImageDimensions, ProcessingEngine,
    SkipReason,
};

pub mod report;
pub mod resolver;

pub use report::*;
pub use resolver::*;

/// Terminal state of one file
#[derive(Debug)]
pub enum BatchOutcome {
    Resized {
        from: ImageDimensions,
        to: ImageDimensions,
        frames: usize,
    },
    DimensionsReported(ImageDimensions),
    Skipped(SkipReason),
    Failed(ResizerError),
}

impl BatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<Result<FileOutcome>> for BatchOutcome {
    fn from(result: Result<FileOutcome>) -> Self {
        match result {
            Ok(FileOutcome::Resized { from, to, frames }) => Self::Resized { from, to, frames },
            Ok(FileOutcome::DimensionsReported(dimensions)) => Self::DimensionsReported(dimensions),
            Ok(FileOutcome::Skipped(reason)) => Self::Skipped(reason),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Outcome of one file together with where it was read from and written to
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: BatchOutcome,
}

/// Counts per outcome kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub resized: usize,
    pub reported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            match report.outcome {
                BatchOutcome::Resized { .. } => summary.resized += 1,
                BatchOutcome::DimensionsReported(_) => summary.reported += 1,
                BatchOutcome::Skipped(_) => summary.skipped += 1,
                BatchOutcome::Failed(_) => summary.failed += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.resized + self.reported + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Runs the processing engine over an [`InputSet`], one file at a time
pub struct BatchRunner<C = ImageCrateCodec> {
    engine: ProcessingEngine<C>,
    policy: DimensionPolicy,
    output: Option<PathBuf>,
}

impl<C: ImageCodec> BatchRunner<C> {
    pub fn new(engine: ProcessingEngine<C>, request: &ResizeRequest) -> Self {
        Self {
            engine,
            policy: DimensionPolicy::from_request(request),
            output: request.output_path.clone(),
        }
    }

    pub fn engine(&self) -> &ProcessingEngine<C> {
        &self.engine
    }

    /// Process every file of `inputs`, reporting each outcome as it lands
    pub fn run<W: Write>(&self, inputs: &InputSet, reporter: &mut Reporter<W>) -> Vec<FileReport> {
        reporter.set_batch(inputs.is_batch());

        if let InputSet::Pattern { pattern, files, .. } = inputs {
            if files.is_empty() {
                info!("No files match {:?}", pattern);
                reporter.no_matches(pattern);
                return Vec::new();
            }
            reporter.files_found(pattern, files.len());
        }

        let search_root = match inputs {
            InputSet::Pattern { root, .. } => Some(root.as_path()),
            InputSet::Single(_) => None,
        };

        let mut reports = Vec::new();
        for input in inputs.files() {
            let output = self.output_path(input, search_root);
            let report = self.process(input, output);
            reporter.file(&report);
            reports.push(report);
        }

        let summary = BatchSummary::from_reports(&reports);
        debug!("Batch finished: {:?}", summary);
        reporter.summary(&summary);

        reports
    }

    /// Process one file, turning any error into a `Failed` outcome
    pub fn process(&self, input: &Path, output: PathBuf) -> FileReport {
        let result = self.engine.process_file(input, &output, &self.policy);
        match &result {
            Err(e) if e.is_recoverable() => debug!("Failed to process {}: {}", input.display(), e),
            Err(e) => warn!("Unexpected failure on {}: {}", input.display(), e),
            Ok(_) => {}
        }

        FileReport {
            input: input.to_path_buf(),
            output,
            outcome: result.into(),
        }
    }

    /// Destination for `input`: the requested output, else the input itself.
    ///
    /// For patterns the requested output is a directory mirroring the layout
    /// below the search root.
    fn output_path(&self, input: &Path, search_root: Option<&Path>) -> PathBuf {
        match (&self.output, search_root) {
            (None, _) => input.to_path_buf(),
            (Some(output), None) => output.clone(),
            (Some(directory), Some(root)) => match input.strip_prefix(root) {
                Ok(relative) => directory.join(relative),
                Err(_) => directory.join(input.file_name().unwrap_or(input.as_os_str())),
            },
        }
    }
}
