//! CLI output formatting.
//!
//! One line per file as it is handled, then a summary:
//!
//! ```text
//! Processed: login.png → processed-screenshots/login_medium.png (1440x900)
//! Skipped: processed-screenshots/chart_medium.png already exists. Use --force to overwrite.
//! Error processing broken.png: failed to decode broken.png: ...
//!
//! Summary: Processed 1 of 3 images
//! Skipped 1 files. Use --force to overwrite existing files.
//! Failed 1 files.
//! ```
//!
//! Each `format_*` function is pure and returns lines for testability; the
//! `print_*` wrappers write them to stdout. Diagnostics go through `tracing`
//! on stderr instead.

use crate::process::{FileOutcome, RunSummary};
use std::path::Path;

/// Input paths are shown by file name; output paths in full.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn format_outcome(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Processed {
            input,
            output,
            width,
            height,
        } => format!(
            "Processed: {} → {} ({}x{})",
            file_name(input),
            output.display(),
            width,
            height
        ),
        FileOutcome::Skipped { output, .. } => format!(
            "Skipped: {} already exists. Use --force to overwrite.",
            output.display()
        ),
        FileOutcome::Failed { input, error } => {
            format!("Error processing {}: {}", file_name(input), error)
        }
    }
}

pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Summary: Processed {} of {} images",
        summary.processed(),
        summary.total()
    )];
    if summary.skipped() > 0 {
        lines.push(format!(
            "Skipped {} files. Use --force to overwrite existing files.",
            summary.skipped()
        ));
    }
    if summary.failed() > 0 {
        lines.push(format!("Failed {} files.", summary.failed()));
    }
    lines
}

pub fn print_outcome(outcome: &FileOutcome) {
    println!("{}", format_outcome(outcome));
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
