//! Command token parsing into a resize request
//!
//! Tokens follow the `-key:value` convention (`-w:128`, `-infile:photo.png`)
//! rather than GNU-style options, so they are interpreted here instead of by
//! clap, which only captures them.

use std::path::PathBuf;
use crate::error::{Result, ResizerError};

const INFILE: &str = "-infile:";
const OUTFILE: &str = "-outfile:";
const WIDTH: &str = "-w:";
const HEIGHT: &str = "-h:";
const SMALLER_ONLY: &str = "-smalleron";
const CONFIG: &str = "-config:";

const VERBOSE: &str = "-verbose";
const DIMENSIONS_ONLY: &str = "-dimension";
const RECURSE: &str = "-s";

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Show usage text and exit
    Help,
    /// Run a resize job
    Resize(ResizeRequest),
}

/// A parsed resize job; immutable once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeRequest {
    /// Input file or pattern (may contain `*` / `?`)
    pub input_path: String,
    /// Output file; `None` overwrites the input
    pub output_path: Option<PathBuf>,
    /// Target width, 0 when unspecified
    pub target_width: u32,
    /// Target height, 0 when unspecified
    pub target_height: u32,
    pub smaller_only: bool,
    pub verbose: bool,
    pub dimensions_only: bool,
    pub recurse_subdirectories: bool,
    /// Optional configuration file
    pub config_path: Option<PathBuf>,
}

impl ResizeRequest {
    /// Parse raw command tokens (program name excluded)
    pub fn parse<I, S>(tokens: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(|t| t.as_ref().to_string()).collect();

        if tokens.is_empty() || tokens.iter().any(|t| t == "/?" || t == "-h") {
            return Invocation::Help;
        }

        let input_path = prefixed_value(&tokens, INFILE)
            .or_else(|| tokens.iter().find(|t| !t.starts_with('-')).map(String::as_str))
            .unwrap_or_default()
            .to_string();

        let request = Self {
            input_path,
            output_path: prefixed_value(&tokens, OUTFILE)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            target_width: parse_dimension(prefixed_value(&tokens, WIDTH)),
            target_height: parse_dimension(prefixed_value(&tokens, HEIGHT)),
            smaller_only: prefixed_value(&tokens, SMALLER_ONLY).is_some(),
            verbose: has_flag(&tokens, VERBOSE),
            dimensions_only: has_flag(&tokens, DIMENSIONS_ONLY),
            recurse_subdirectories: has_flag(&tokens, RECURSE),
            config_path: prefixed_value(&tokens, CONFIG)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        };

        Invocation::Resize(request)
    }

    /// Reject requests that cannot run; no file is touched on error
    pub fn validate(&self) -> Result<()> {
        if self.input_path.is_empty() {
            return Err(ResizerError::usage("Error: Need to specify file"));
        }
        if self.target_width == 0 && self.target_height == 0 && !self.dimensions_only {
            return Err(ResizerError::usage("Error: Need to specify size"));
        }
        Ok(())
    }

    /// Whether the input names a wildcard pattern rather than one file
    pub fn is_pattern(&self) -> bool {
        crate::batch::is_pattern(&self.input_path)
    }
}

/// Value of the first token starting with `prefix` (ASCII case-insensitive)
fn prefixed_value<'a>(tokens: &'a [String], prefix: &str) -> Option<&'a str> {
    tokens.iter().find_map(|token| {
        let head = token.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix).then(|| &token[prefix.len()..])
    })
}

fn has_flag(tokens: &[String], flag: &str) -> bool {
    tokens.iter().any(|t| t == flag)
}

/// Malformed or missing numbers mean "unspecified"
fn parse_dimension(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
