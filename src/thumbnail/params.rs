//! Parameter types for thumbnail generation.
//!
//! These structs describe *what* to produce and *how hard to try*, not how
//! pixels are pushed. They sit between the
//! [`operations`](super::operations) module and the
//! [`backend`](super::backend), so a mock backend sees exactly what the real
//! one would.
//!
//! - [`Quality`]: JPEG quality (1–100, default 85). Clamped on construction.
//! - [`ThumbnailParams`]: bounding box and quality of the rendered thumbnail.
//! - [`RetryPolicy`]: attempt count and fixed delay between attempts.

use std::time::Duration;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Target box for a thumbnail. The source is scaled down to fit inside it,
/// keeping its aspect ratio; smaller sources are left at their own size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailParams {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl Default for ThumbnailParams {
    fn default() -> Self {
        Self {
            max_width: 64,
            max_height: 64,
            quality: Quality::default(),
        }
    }
}

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}
