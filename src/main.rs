//! ImageResizer CLI - resize images and batches of images
//!
//! Arguments use the `-key:value` form (`-w:128`, `-infile:photo.png`) and
//! are handed to the library's token parser unchanged.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::debug;

use imageresizer::{Config, Invocation, Reporter, ResizeRequest, ResizerError};

/// ImageResizer - batch image resizer
#[derive(Parser)]
#[command(
    name = "imageresizer",
    version,
    about = "Resize images, animated GIFs and wildcard batches",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Resize arguments, e.g. `photo.png -w:128 -smallerOnly`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    tokens: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let request = match ResizeRequest::parse(&cli.tokens) {
        Invocation::Help => {
            Reporter::stdout(false).usage(None);
            return ExitCode::SUCCESS;
        }
        Invocation::Resize(request) => request,
    };

    let mut reporter = Reporter::stdout(request.verbose);
    if let Err(e) = request.validate() {
        reporter.usage(Some(&e.to_string()));
        return ExitCode::SUCCESS;
    }

    let config = match load_config(request.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    imageresizer::init_logging(&config.logging);

    let root = match std::env::current_dir() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{}: Cannot read current directory: {}", style("Error").red().bold(), e);
            return ExitCode::FAILURE;
        }
    };
    debug!("Resolving {:?} under {:?}", request.input_path, root);

    match imageresizer::run(&request, &config, &root, &mut reporter) {
        Ok(summary) if summary.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e @ (ResizerError::Usage { .. } | ResizerError::NotFound { .. })) => {
            reporter.usage(Some(&e.to_string()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Load the optional configuration file, falling back to defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}
