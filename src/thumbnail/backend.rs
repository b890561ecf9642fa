//! Thumbnail rendering backend trait and shared types.
//!
//! The [`ImageBackend`] trait turns raw source bytes into encoded JPEG
//! thumbnail bytes. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use
//! [`tests::MockBackend`] to script failures and inspect calls without
//! decoding real images.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// Trait for thumbnail rendering backends.
pub trait ImageBackend {
    /// Decode `source`, flatten transparency onto white, fit it inside the
    /// bounds in `params` and return JPEG bytes.
    fn thumbnail(&self, source: &[u8], params: &ThumbnailParams) -> Result<Vec<u8>, BackendError>;
}
