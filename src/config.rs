//! Generator configuration.
//!
//! Handles loading and validating `boardgen.toml`. Every setting has a stock
//! default, so the file is optional and may be sparse: specify only the
//! values you want to change. Command-line path flags are applied on top of
//! whatever the file resolves to.
//!
//! ## Config File Location
//!
//! `boardgen.toml` in the working directory is picked up automatically.
//! `--config <FILE>` points at a different file, which must then exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! boards = "boards"            # One YAML file per board
//! template = "page_template"   # Static site copied verbatim into output
//! output = "out"               # Deleted and rebuilt on every run
//! cache = ".thumbnail-cache"   # Raw source images, keyed by URL hash
//!
//! [input]
//! extension = "yaml"           # Board file extension
//! skip = "_template.yaml"      # Example file that is never processed
//! dataset = "board_data.json"  # Dataset file name inside the output dir
//!
//! [thumbnails]
//! max_size = [64, 64]          # Bounding box [width, height] in pixels
//! quality = 85                 # JPEG quality (1-100)
//!
//! [fetch]
//! timeout_secs = 10            # Per-request timeout
//! attempts = 3                 # Total attempts per image
//! retry_delay_secs = 5         # Pause between attempts
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::thumbnail::{Quality, RetryPolicy, ThumbnailParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "boardgen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `boardgen.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Input, template, output and cache directories.
    pub paths: PathsConfig,
    /// Board file discovery and dataset naming.
    pub input: InputConfig,
    /// Thumbnail bounding box and JPEG quality.
    pub thumbnails: ThumbnailsConfig,
    /// Network timeout and retry policy.
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub boards: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            boards: PathBuf::from("boards"),
            template: PathBuf::from("page_template"),
            output: PathBuf::from("out"),
            cache: PathBuf::from(".thumbnail-cache"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Extension (without the dot) of board files.
    pub extension: String,
    /// File name excluded from processing (the authoring template).
    pub skip: String,
    /// File name of the dataset written into the output directory.
    pub dataset: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: "yaml".to_string(),
            skip: "_template.yaml".to_string(),
            dataset: "board_data.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Bounding box as `[width, height]`.
    pub max_size: [u32; 2],
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_size: [64, 64],
            quality: 85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            attempts: 3,
            retry_delay_secs: 5,
        }
    }
}

impl GeneratorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.quality == 0 || self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.max_size[0] == 0 || self.thumbnails.max_size[1] == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_size values must be non-zero".into(),
            ));
        }
        if self.fetch.attempts == 0 {
            return Err(ConfigError::Validation(
                "fetch.attempts must be at least 1".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be non-zero".into(),
            ));
        }
        if self.input.extension.is_empty() || self.input.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "input.extension must be non-empty and given without the dot".into(),
            ));
        }
        if !is_plain_file_name(&self.input.dataset) {
            return Err(ConfigError::Validation(
                "input.dataset must be a plain file name".into(),
            ));
        }
        Ok(())
    }

    pub fn thumbnail_params(&self) -> ThumbnailParams {
        ThumbnailParams {
            max_width: self.thumbnails.max_size[0],
            max_height: self.thumbnails.max_size[1],
            quality: Quality::new(self.thumbnails.quality),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch.attempts,
            delay: Duration::from_secs(self.fetch.retry_delay_secs),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Full path of the dataset file inside the output directory.
    pub fn dataset_path(&self) -> PathBuf {
        self.paths.output.join(&self.input.dataset)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<GeneratorConfig, ConfigError> {
    let config: GeneratorConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a specific config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load `boardgen.toml` from the given directory.
///
/// Returns stock defaults when the file does not exist.
pub fn load_config(dir: &Path) -> Result<GeneratorConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `boardgen.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# boardgen configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Directories
# ---------------------------------------------------------------------------
[paths]
# One YAML file per board.
boards = "boards"

# Static site copied verbatim into the output directory.
template = "page_template"

# Build output. Deleted and recreated on every run.
output = "out"

# Raw source images keyed by the SHA-256 of their URL. Never cleared
# automatically: delete an entry by hand to force a re-download.
cache = ".thumbnail-cache"

# ---------------------------------------------------------------------------
# Input discovery
# ---------------------------------------------------------------------------
[input]
# Extension of board files, without the dot.
extension = "yaml"

# Authoring template in the boards directory; never processed.
skip = "_template.yaml"

# Name of the dataset file written into the output directory.
dataset = "board_data.json"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Bounding box as [width, height]. Images are scaled down to fit, keeping
# their aspect ratio, and never scaled up.
max_size = [64, 64]

# JPEG quality (1 = worst, 100 = best).
quality = 85

# ---------------------------------------------------------------------------
# Image fetching
# ---------------------------------------------------------------------------
[fetch]
# Timeout for a whole request, in seconds.
timeout_secs = 10

# Total attempts per image (fetch, decode and encode are retried together).
attempts = 3

# Pause between attempts, in seconds.
retry_delay_secs = 5
"##
}
