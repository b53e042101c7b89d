//! ImageResizer - batch image resizing from the command line
//!
//! Resizes single images or every file matching a wildcard pattern,
//! animated GIFs included. A missing width or height is inferred from each
//! image's own aspect ratio, and a smaller-only policy can refuse to enlarge.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use imageresizer::{Config, Invocation, Reporter, ResizeRequest};
//! use std::path::Path;
//!
//! let request = match ResizeRequest::parse(["photo.png", "-w:200"]) {
//!     Invocation::Resize(request) => request,
//!     Invocation::Help => unreachable!(),
//! };
//!
//! let mut reporter = Reporter::stdout(request.verbose);
//! let summary = imageresizer::run(&request, &Config::default(), Path::new("."), &mut reporter)?;
//! println!("{} resized", summary.resized);
//! # Ok::<(), imageresizer::ResizerError>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod config;
pub mod error;
pub mod processing;

use std::io::Write;
use std::path::Path;

// Re-export commonly used types
pub use batch::{BatchOutcome, BatchRunner, BatchSummary, FileReport, FileResolver, InputSet, Reporter};
pub use config::{Config, Invocation, LoggingConfig, ResizeRequest};
pub use error::{Result, ResizerError};
pub use processing::{DimensionPolicy, ImageDimensions, ProcessingEngine};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.json_format {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    };

    if installed {
        info!("ImageResizer v{} initialized", VERSION);
    }
}

/// Run a parsed request: validate it, resolve its inputs below `root` and
/// process them.
///
/// Usage and not-found errors come back as `Err` before any file is opened;
/// per-file failures are part of the returned summary.
pub fn run<W: Write>(
    request: &ResizeRequest,
    config: &Config,
    root: &Path,
    reporter: &mut Reporter<W>,
) -> Result<BatchSummary> {
    request.validate()?;

    let inputs = FileResolver::new(root)
        .recursive(request.recurse_subdirectories)
        .resolve(&request.input_path)?;

    let runner = BatchRunner::new(ProcessingEngine::from_config(&config.processing), request);
    let reports = runner.run(&inputs, reporter);

    let summary = BatchSummary::from_reports(&reports);
    debug!("Processed {} file(s): {:?}", summary.total(), summary);
    Ok(summary)
}
