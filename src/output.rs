//! CLI output formatting for build and check runs.
//!
//! # Information-First Display
//!
//! Each board is shown by its positional index and identity, with the
//! source file and thumbnail status as indented context lines. Validation
//! runs before normalization, so a build lists every file twice: once when
//! its schema is checked, once when its record is produced.
//!
//! # Output Format
//!
//! ```text
//! Boards: 3 files in boards
//! 001 esp32-devkit.yaml: valid
//! 002 pico.yaml: valid
//! 003 xiao.yaml
//!     Error: Error validating schema: missing field `chip`
//! ```
//!
//! ```text
//! 001 ESP32 DevKit
//!     Source: esp32-devkit.yaml
//!     Thumbnail: fetched
//! 002 Pico
//!     Source: pico.yaml
//!     Thumbnail: cached
//! Wrote 2 boards to "out/board_data.json"
//! Copied 4 template files
//! Cache: 1 cached, 1 fetched (2 total)
//! ```
//!
//! # Architecture
//!
//! Every output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::normalize::ThumbnailStatus;
use crate::pipeline::{BuildSummary, CheckSummary, PipelineEvent};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn thumbnail_line(status: ThumbnailStatus, attempts: u32) -> String {
    let label = match status {
        ThumbnailStatus::None => "none",
        ThumbnailStatus::Cached => "cached",
        ThumbnailStatus::Fetched => "fetched",
    };
    if attempts > 1 {
        format!("{}Thumbnail: {} (after {} attempts)", indent(1), label, attempts)
    } else {
        format!("{}Thumbnail: {}", indent(1), label)
    }
}

/// Format a single pipeline progress event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Discovered { dir, count } => {
            vec![format!(
                "Boards: {} in {}",
                plural(*count, "file", "files"),
                dir.display()
            )]
        }
        PipelineEvent::FileValidated { index, file } => {
            vec![format!("{} {}: valid", format_index(*index), file)]
        }
        PipelineEvent::FileRejected { index, file, error }
        | PipelineEvent::BoardFailed { index, file, error } => vec![
            format!("{} {}", format_index(*index), file),
            format!("{}Error: {}", indent(1), error),
        ],
        PipelineEvent::BoardNormalized {
            index,
            file,
            name,
            thumbnail,
            attempts,
        } => vec![
            format!("{} {}", format_index(*index), name),
            format!("{}Source: {}", indent(1), file),
            thumbnail_line(*thumbnail, *attempts),
        ],
        PipelineEvent::DatasetWritten { path, boards } => {
            vec![format!(
                "Wrote {} to \"{}\"",
                plural(*boards, "board", "boards"),
                path.display()
            )]
        }
        PipelineEvent::TemplateCopied { files } => {
            vec![format!(
                "Copied {}",
                plural(*files, "template file", "template files")
            )]
        }
    }
}

/// Print a pipeline event to stdout.
pub fn print_pipeline_event(event: &PipelineEvent) {
    for line in format_pipeline_event(event) {
        println!("{}", line);
    }
}

/// Format the closing lines of a successful build.
pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    vec![format!("Cache: {}", summary.cache_stats)]
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}

/// Format the closing line of a successful check.
pub fn format_check_summary(summary: &CheckSummary) -> Vec<String> {
    vec![format!(
        "{} valid",
        plural(summary.boards, "board", "boards")
    )]
}

pub fn print_check_summary(summary: &CheckSummary) {
    for line in format_check_summary(summary) {
        println!("{}", line);
    }
}
