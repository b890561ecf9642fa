//! Memory size strings → byte counts.
//!
//! Board files describe flash and RAM the way datasheets do: `"4MB"`,
//! `"520 KB"`, `"1GB"`. Units are binary (1 KB = 1024 bytes) and matched
//! case-insensitively. The literal `"0"` and empty input both mean zero,
//! which is how boards without on-board flash are written.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+)\s*(KB|MB|GB)$").expect("size pattern is a valid regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    #[error("invalid memory size format: \"{0}\"")]
    Malformed(String),
    #[error("memory size out of range: \"{0}\"")]
    Overflow(String),
}

/// Parse a size string like `"4MB"` into bytes.
///
/// ```
/// use boardgen::size::parse_memory_size;
/// assert_eq!(parse_memory_size(Some("2MB")), Ok(2 * 1024 * 1024));
/// assert_eq!(parse_memory_size(Some("0")), Ok(0));
/// assert_eq!(parse_memory_size(None), Ok(0));
/// ```
pub fn parse_memory_size(input: Option<&str>) -> Result<u64, SizeError> {
    let text = match input {
        None => return Ok(0),
        Some(t) if t.is_empty() || t == "0" => return Ok(0),
        Some(t) => t,
    };

    let caps = SIZE_PATTERN
        .captures(text)
        .ok_or_else(|| SizeError::Malformed(text.to_string()))?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|_| SizeError::Overflow(text.to_string()))?;
    let exponent = match caps[2].to_ascii_uppercase().as_str() {
        "KB" => 1,
        "MB" => 2,
        "GB" => 3,
        _ => return Err(SizeError::Malformed(text.to_string())),
    };

    1024u64
        .checked_pow(exponent)
        .and_then(|multiplier| value.checked_mul(multiplier))
        .ok_or_else(|| SizeError::Overflow(text.to_string()))
}
