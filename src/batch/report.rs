//! User-facing console messages

use std::io::{self, Write};
use console::{style, StyledObject};

use crate::batch::{BatchOutcome, BatchSummary, FileReport};

/// Usage text shown for help requests and usage errors
pub const USAGE: &str = "\
Usage:
    imageresizer -infile:<inFileName> -outfile:<outFileName> -w:<width> -h:<height>
  or
    imageresizer <inFileName> -w:<width> -h:<height>
  or
    imageresizer -infile:<pattern> -w:<width> [-s]

Example: (Save a smaller copy of an image)
    imageresizer -infile:Luke.tga -outfile:SmallLuke.tga -w:128 -h:128
Example: (Resize keeping the aspect ratio; the missing dimension is inferred)
    imageresizer -infile:Luke.tga -w:128
Example: (Shrink every PNG below the current directory, never enlarging)
    imageresizer *.png -s -w:64 -smallerOnly

More options:
-smallerOnly     Only resize if it makes the image smaller; never enlarge.
-verbose         Print what is being done.
-dimension       Print the image dimensions and exit without resizing.
-s               With a pattern, search subdirectories too.
-outfile:<path>  Output file; with a pattern, the output directory.
-config:<file>   Load settings (filter, JPEG quality, logging) from a TOML or YAML file.
";

/// Writes progress, reports and failures to a console stream
pub struct Reporter<W: Write> {
    out: W,
    verbose: bool,
    batch: bool,
    colors: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        let mut reporter = Self::new(io::stdout(), verbose);
        reporter.colors = console::colors_enabled();
        reporter
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            batch: false,
            colors: false,
        }
    }

    /// Prefix per-file messages with the file path
    pub fn set_batch(&mut self, batch: bool) {
        self.batch = batch;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print usage text, preceded by an optional error message
    pub fn usage(&mut self, message: Option<&str>) {
        if let Some(message) = message {
            self.line(format_args!("{}", self.paint(message).red()));
        }
        self.line(format_args!("{}", USAGE));
    }

    pub fn files_found(&mut self, pattern: &str, count: usize) {
        if self.verbose {
            self.line(format_args!("Found {} file(s) matching '{}'", count, pattern));
        }
    }

    pub fn no_matches(&mut self, pattern: &str) {
        self.line(format_args!("No files match '{}'", pattern));
    }

    pub fn file(&mut self, report: &FileReport) {
        let prefix = if self.batch {
            format!("{}: ", report.input.display())
        } else {
            String::new()
        };

        match &report.outcome {
            BatchOutcome::Resized { to, .. } => {
                if self.verbose {
                    self.line(format_args!("Resizing {} to {}", report.input.display(), to));
                }
            }
            BatchOutcome::DimensionsReported(dimensions) => {
                self.line(format_args!("{}{}", prefix, dimensions));
            }
            BatchOutcome::Skipped(reason) => {
                if self.verbose {
                    self.line(format_args!("{}{}, not resizing", prefix, reason));
                }
            }
            BatchOutcome::Failed(error) => {
                // The prefix already names the input; errors about another file keep its name
                let message = match error.file_path() {
                    Some(file) if self.batch && file == report.input => error.user_message(),
                    _ => error.to_string(),
                };
                self.line(format_args!("{}: {}{}", self.paint("Error").red().bold(), prefix, message));
            }
        }
    }

    pub fn summary(&mut self, summary: &BatchSummary) {
        if !(self.verbose && self.batch) {
            return;
        }
        self.line(format_args!(
            "{}: {} file(s), {} resized, {} skipped, {} reported, {} failed",
            self.paint("Summary").bold(),
            summary.total(),
            summary.resized,
            summary.skipped,
            summary.reported,
            summary.failed
        ));
    }

    fn paint<D>(&self, value: D) -> StyledObject<D> {
        style(value).force_styling(self.colors)
    }

    // Console write failures are not worth aborting a batch for
    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResizerError;
    use crate::processing::{ImageDimensions, SkipReason};
    use std::path::{Path, PathBuf};

    fn report(outcome: BatchOutcome) -> FileReport {
        FileReport {
            input: PathBuf::from("dir/photo.png"),
            output: PathBuf::from("dir/photo.png"),
            outcome,
        }
    }

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_dimensions_always_printed() {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.file(&report(BatchOutcome::DimensionsReported(ImageDimensions::new(1000, 500))));
        assert_eq!(output(reporter), "1000x500\n");
    }

    #[test]
    fn test_batch_messages_are_prefixed() {
        let mut reporter = Reporter::new(Vec::new(), true);
        reporter.set_batch(true);
        reporter.file(&report(BatchOutcome::DimensionsReported(ImageDimensions::new(4, 2))));
        reporter.file(&report(BatchOutcome::Skipped(SkipReason::WouldNotDecrease)));

        let text = output(reporter);
        assert!(text.contains("dir/photo.png: 4x2"));
        assert!(text.contains("dir/photo.png: operation would not decrease image size, not resizing"));
    }

    #[test]
    fn test_progress_only_when_verbose() {
        let resized = || BatchOutcome::Resized {
            from: ImageDimensions::new(1000, 500),
            to: ImageDimensions::new(200, 100),
            frames: 1,
        };

        let mut quiet = Reporter::new(Vec::new(), false);
        quiet.file(&report(resized()));
        quiet.file(&report(BatchOutcome::Skipped(SkipReason::WouldNotDecrease)));
        quiet.files_found("*.png", 3);
        assert_eq!(output(quiet), "");

        let mut verbose = Reporter::new(Vec::new(), true);
        verbose.file(&report(resized()));
        assert_eq!(output(verbose), "Resizing dir/photo.png to 200x100\n");
    }

    #[test]
    fn test_failures_always_printed() {
        let error = ResizerError::decode(Path::new("dir/photo.png"), "bad header");

        let mut single = Reporter::new(Vec::new(), false);
        single.file(&report(BatchOutcome::Failed(error)));
        let text = output(single);
        assert!(text.contains("Error"));
        assert!(text.contains("dir/photo.png"));
        assert!(text.contains("bad header"));

        let error = ResizerError::decode(Path::new("dir/photo.png"), "bad header");
        let mut batch = Reporter::new(Vec::new(), false);
        batch.set_batch(true);
        batch.file(&report(BatchOutcome::Failed(error)));
        assert!(output(batch).contains("dir/photo.png: cannot read image: bad header"));
    }

    #[test]
    fn test_batch_failure_on_output_names_output() {
        let error = ResizerError::encode(Path::new("out/photo.png"), "disk full");
        let mut batch = Reporter::new(Vec::new(), false);
        batch.set_batch(true);
        batch.file(&report(BatchOutcome::Failed(error)));

        let text = output(batch);
        assert!(text.contains("dir/photo.png: Cannot write image out/photo.png"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn test_summary_only_for_verbose_batches() {
        let summary = BatchSummary { resized: 2, reported: 0, skipped: 1, failed: 1 };

        let mut single = Reporter::new(Vec::new(), true);
        single.summary(&summary);
        assert_eq!(output(single), "");

        let mut batch = Reporter::new(Vec::new(), true);
        batch.set_batch(true);
        batch.summary(&summary);
        assert_eq!(output(batch), "Summary: 4 file(s), 2 resized, 1 skipped, 0 reported, 1 failed\n");
    }

    #[test]
    fn test_usage_with_message() {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.usage(Some("Error: Need to specify size"));
        let text = output(reporter);
        assert!(text.starts_with("Error: Need to specify size\n"));
        assert!(text.contains("Usage:"));
    }
}
