//! Board file validation.
//!
//! A board file is checked in two steps, mirroring the two ways it can be
//! wrong:
//!
//! 1. **Malformed source**: the bytes are not YAML at all.
//! 2. **Schema violation**: the YAML parses but does not describe a board:
//!    unknown keys, missing required keys, wrong value types, enum values
//!    outside the catalog vocabulary, size strings that do not match the
//!    size pattern, or `image`/`url` values that are not URIs.
//!
//! Structural rules (fields, types, enums) are enforced by deserializing
//! into [`RawBoard`], which denies unknown fields. String-level rules that
//! serde cannot express are checked afterwards; all of them are reported
//! together so one run surfaces every problem in the file.

use crate::types::RawBoard;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static FLASH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+\s*(KB|MB|GB)|0)$").expect("flash pattern is a valid regex")
});

static RAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\s*(KB|MB|GB)$").expect("ram pattern is a valid regex"));

/// RFC 3986 scheme followed by a non-empty, whitespace-free remainder.
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("uri pattern is a valid regex")
});

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing YAML: {0}")]
    Malformed(#[source] serde_yaml::Error),
    #[error("Error validating schema: {0}")]
    Schema(String),
}

/// Read and validate a board file.
pub fn validate_file(path: &Path) -> Result<RawBoard, ValidationError> {
    let content = fs::read_to_string(path)?;
    validate_source(&content)
}

/// Validate the text of a board file.
pub fn validate_source(source: &str) -> Result<RawBoard, ValidationError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(source).map_err(ValidationError::Malformed)?;
    validate_value(&value)
}

/// Validate an already-parsed YAML value against the board schema.
pub fn validate_value(value: &serde_yaml::Value) -> Result<RawBoard, ValidationError> {
    let board: RawBoard = serde_yaml::from_value(value.clone())
        .map_err(|e| ValidationError::Schema(e.to_string()))?;

    let violations = pattern_violations(&board);
    if violations.is_empty() {
        Ok(board)
    } else {
        Err(ValidationError::Schema(violations.join("; ")))
    }
}

fn pattern_violations(board: &RawBoard) -> Vec<String> {
    let mut violations = Vec::new();

    if !FLASH_PATTERN.is_match(&board.flash) {
        violations.push(format!(
            "flash: \"{}\" does not match {}",
            board.flash,
            FLASH_PATTERN.as_str()
        ));
    }
    if !RAM_PATTERN.is_match(&board.ram) {
        violations.push(format!(
            "ram: \"{}\" does not match {}",
            board.ram,
            RAM_PATTERN.as_str()
        ));
    }

    for (field, value) in [("image", &board.image), ("url", &board.url)] {
        if let Some(uri) = value
            && !URI_PATTERN.is_match(uri)
        {
            violations.push(format!("{field}: \"{uri}\" is not a valid URI"));
        }
    }

    if let Some(dup) = first_duplicate(&board.connectivity) {
        violations.push(format!("connectivity: {dup:?} is listed more than once"));
    }
    if let Some(dup) = first_duplicate(&board.connectors) {
        violations.push(format!("connectors: {dup:?} is listed more than once"));
    }

    violations
}

fn first_duplicate<T: Eq + Hash + Copy>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::new();
    items.iter().copied().find(|item| !seen.insert(*item))
}
