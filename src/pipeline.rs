//! Build orchestration: board files in, dataset and site out.
//!
//! A build runs in strictly ordered phases:
//!
//! ```text
//! 1. Setup      boards/ + page_template/ exist, template has no dataset-named entry,
//!               out/ does not overlap boards/, page_template/ or the cache
//! 2. Reset      out/ deleted and recreated, cache dir created if missing
//! 3. Discover   *.yaml minus _template.yaml, sorted by file name
//! 4. Validate   every file, then abort if any failed
//! 5. Normalize  every board (thumbnails included), then abort if any failed
//! 6. Write      out/board_data.json
//! 7. Copy       page_template/ → out/
//! ```
//!
//! ## Fail-Fast per Phase
//!
//! Within a phase every file is processed even after a failure, so one run
//! reports all broken files at once. Each file yields a [`FileOutcome`]; the
//! outcomes are partitioned at the phase boundary and any failure stops the
//! build before the next phase. Nothing is written to the output directory
//! unless every board made it through normalization.
//!
//! ## Progress Reporting
//!
//! The orchestrator prints nothing itself. Progress goes to a caller-supplied
//! reporter as [`PipelineEvent`]s; the CLI renders them with
//! [`crate::output::format_pipeline_event`] and tests can simply collect them.

use crate::cache::{CacheStats, ImageCache};
use crate::config::GeneratorConfig;
use crate::normalize::{NormalizeError, ThumbnailStatus, normalize};
use crate::thumbnail::{HttpFetcher, ImageBackend, ImageFetcher, RustBackend, Thumbnailer};
use crate::types::{Board, Dataset, RawBoard};
use crate::validate::{ValidationError, validate_file};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to walk template directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Directory \"{path}\" not found", path = .0.display())]
    MissingDirectory(PathBuf),
    #[error(
        "Template directory contains \"{name}\", which would be overwritten by the dataset",
        name = .0.display()
    )]
    TemplateConflict(PathBuf),
    #[error(
        "Output directory \"{output}\" overlaps the {role} directory \"{other}\"",
        output = .output.display(),
        other = .other.display()
    )]
    OverlappingPaths {
        output: PathBuf,
        role: &'static str,
        other: PathBuf,
    },
    #[error("{} of {total} board files failed validation: {}", .files.len(), .files.join(", "))]
    ValidationFailed { files: Vec<String>, total: usize },
    #[error("{} of {total} boards failed normalization: {}", .files.len(), .files.join(", "))]
    NormalizationFailed { files: Vec<String>, total: usize },
}

/// Per-file result of one phase.
#[derive(Debug)]
pub struct FileOutcome<T, E> {
    /// File name relative to the boards directory.
    pub file: String,
    pub result: Result<T, E>,
}

/// Progress notifications emitted while a build or check runs.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Discovered {
        dir: PathBuf,
        count: usize,
    },
    FileValidated {
        index: usize,
        file: String,
    },
    FileRejected {
        index: usize,
        file: String,
        error: String,
    },
    BoardNormalized {
        index: usize,
        file: String,
        name: String,
        thumbnail: ThumbnailStatus,
        attempts: u32,
    },
    BoardFailed {
        index: usize,
        file: String,
        error: String,
    },
    DatasetWritten {
        path: PathBuf,
        boards: usize,
    },
    TemplateCopied {
        files: usize,
    },
}

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub boards: usize,
    pub dataset_path: PathBuf,
    pub template_files: usize,
    pub cache_stats: CacheStats,
}

/// What a successful check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub boards: usize,
}

/// Run a full build with the network fetcher and the `image` crate backend.
pub fn run(
    config: &GeneratorConfig,
    report: impl FnMut(&PipelineEvent),
) -> Result<BuildSummary, PipelineError> {
    let fetcher = HttpFetcher::new(config.fetch_timeout());
    let backend = RustBackend::new();
    run_with(config, &fetcher, &backend, report)
}

/// Run a full build with an explicit fetcher and backend.
pub fn run_with<F: ImageFetcher, B: ImageBackend>(
    config: &GeneratorConfig,
    fetcher: &F,
    backend: &B,
    mut report: impl FnMut(&PipelineEvent),
) -> Result<BuildSummary, PipelineError> {
    let paths = &config.paths;
    check_setup(config)?;
    check_output_location(config)?;

    reset_output(&paths.output)?;
    let cache = ImageCache::open(&paths.cache)?;

    let files = discover_inputs(config)?;
    report(&PipelineEvent::Discovered {
        dir: paths.boards.clone(),
        count: files.len(),
    });

    let validated = validate_all(&files, &mut report);
    let total = validated.len();
    let raw = partition(validated).map_err(|files| PipelineError::ValidationFailed { files, total })?;

    let mut thumbnails = Thumbnailer::new(
        fetcher,
        backend,
        &cache,
        config.thumbnail_params(),
        config.retry_policy(),
    );
    let normalized = normalize_all(raw, &mut thumbnails, &mut report);
    let boards = partition(normalized)
        .map_err(|files| PipelineError::NormalizationFailed { files, total })?
        .into_iter()
        .map(|(_, board)| board)
        .collect::<Vec<_>>();

    let dataset_path = config.dataset_path();
    let count = boards.len();
    write_dataset(&dataset_path, Dataset { data: boards })?;
    report(&PipelineEvent::DatasetWritten {
        path: dataset_path.clone(),
        boards: count,
    });

    let template_files = copy_template(&paths.template, &paths.output)?;
    report(&PipelineEvent::TemplateCopied {
        files: template_files,
    });

    let cache_stats = thumbnails.stats();
    info!(boards = count, cache = %cache_stats, "build complete");
    Ok(BuildSummary {
        boards: count,
        dataset_path,
        template_files,
        cache_stats,
    })
}

/// Validate every board file without touching the output, the cache or
/// the network.
pub fn check(
    config: &GeneratorConfig,
    mut report: impl FnMut(&PipelineEvent),
) -> Result<CheckSummary, PipelineError> {
    check_setup(config)?;

    let files = discover_inputs(config)?;
    report(&PipelineEvent::Discovered {
        dir: config.paths.boards.clone(),
        count: files.len(),
    });

    let validated = validate_all(&files, &mut report);
    let total = validated.len();
    let raw = partition(validated).map_err(|files| PipelineError::ValidationFailed { files, total })?;
    Ok(CheckSummary { boards: raw.len() })
}

fn check_setup(config: &GeneratorConfig) -> Result<(), PipelineError> {
    let paths = &config.paths;
    for dir in [&paths.boards, &paths.template] {
        if !dir.is_dir() {
            return Err(PipelineError::MissingDirectory(dir.clone()));
        }
    }

    let shadowed = paths.template.join(&config.input.dataset);
    if fs::symlink_metadata(&shadowed).is_ok() {
        return Err(PipelineError::TemplateConflict(shadowed));
    }
    Ok(())
}

/// Reject an output directory that is, contains, or sits inside one of the
/// other configured directories. The output is deleted on every build.
fn check_output_location(config: &GeneratorConfig) -> Result<(), PipelineError> {
    let paths = &config.paths;
    let output = resolve_path(&paths.output)?;
    for (role, dir) in [
        ("boards", &paths.boards),
        ("template", &paths.template),
        ("cache", &paths.cache),
    ] {
        let other = resolve_path(dir)?;
        if output.starts_with(&other) || other.starts_with(&output) {
            return Err(PipelineError::OverlappingPaths {
                output: paths.output.clone(),
                role,
                other: dir.clone(),
            });
        }
    }
    Ok(())
}

/// Absolute form of `path` with symlinks resolved as far as it exists.
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(real) = existing.canonicalize() {
            return Ok(missing.iter().rev().fold(real, |acc, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

fn reset_output(output: &Path) -> std::io::Result<()> {
    if output.exists() {
        debug!(path = %output.display(), "removing previous output");
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output)
}

/// List board files in the configured boards directory.
///
/// Regular files with the configured extension, minus the skip file, sorted
/// by file name so output order never depends on directory listing order.
pub fn discover_inputs(config: &GeneratorConfig) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(&config.paths.boards)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches_extension = path
            .extension()
            .is_some_and(|ext| ext == config.input.extension.as_str());
        let skipped = entry.file_name() == config.input.skip.as_str();
        if matches_extension && !skipped {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn validate_all(
    files: &[PathBuf],
    report: &mut impl FnMut(&PipelineEvent),
) -> Vec<FileOutcome<RawBoard, ValidationError>> {
    files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let file = file_label(path);
            let result = validate_file(path);
            match &result {
                Ok(_) => report(&PipelineEvent::FileValidated {
                    index: i + 1,
                    file: file.clone(),
                }),
                Err(err) => report(&PipelineEvent::FileRejected {
                    index: i + 1,
                    file: file.clone(),
                    error: err.to_string(),
                }),
            }
            FileOutcome { file, result }
        })
        .collect()
}

fn normalize_all<F: ImageFetcher, B: ImageBackend>(
    boards: Vec<(String, RawBoard)>,
    thumbnails: &mut Thumbnailer<'_, F, B>,
    report: &mut impl FnMut(&PipelineEvent),
) -> Vec<FileOutcome<Board, NormalizeError>> {
    boards
        .into_iter()
        .enumerate()
        .map(|(i, (file, raw))| {
            let result = normalize(raw, thumbnails);
            let result = match result {
                Ok(n) => {
                    report(&PipelineEvent::BoardNormalized {
                        index: i + 1,
                        file: file.clone(),
                        name: n.board.name.clone(),
                        thumbnail: n.thumbnail,
                        attempts: n.attempts,
                    });
                    Ok(n.board)
                }
                Err(err) => {
                    report(&PipelineEvent::BoardFailed {
                        index: i + 1,
                        file: file.clone(),
                        error: err.to_string(),
                    });
                    Err(err)
                }
            };
            FileOutcome { file, result }
        })
        .collect()
}

/// Split phase outcomes into successes, or the names of every failed file.
///
/// Successes keep their input order.
pub fn partition<T, E>(
    outcomes: Vec<FileOutcome<T, E>>,
) -> Result<Vec<(String, T)>, Vec<String>> {
    let mut ok = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(value) => ok.push((outcome.file, value)),
            Err(_) => failed.push(outcome.file),
        }
    }
    if failed.is_empty() { Ok(ok) } else { Err(failed) }
}

/// Write the dataset as pretty-printed JSON.
pub fn write_dataset(path: &Path, dataset: Dataset) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(&dataset)?;
    fs::write(path, json)?;
    Ok(())
}

/// Copy the template tree into `dst`, overwriting same-named files.
///
/// Returns the number of files copied.
pub fn copy_template(src: &Path, dst: &Path) -> Result<usize, PipelineError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
