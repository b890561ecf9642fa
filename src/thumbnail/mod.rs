//! Thumbnail generation: fetch, cache, flatten, resize and encode.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Fetch** | `ureq` blocking GET with a global timeout |
//! | **Cache** | [`crate::cache::ImageCache`], keyed by URL hash |
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | Lanczos3, fit inside the bounding box, never upscale |
//! | **Encode** | JPEG → `data:image/jpeg;base64,...` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing thumbnails and retries
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Fetch**: [`ImageFetcher`] trait + [`HttpFetcher`]
//! - **Operations**: [`Thumbnailer`], combining cache + fetch + backend with retry

pub mod backend;
mod calculations;
pub mod fetch;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::fit_within;
pub use fetch::{FetchError, HttpFetcher, ImageFetcher};
pub use operations::{
    DATA_URI_PREFIX, ImageOrigin, ThumbnailError, ThumbnailOutcome, Thumbnailer, encode_data_uri,
};
pub use params::{Quality, RetryPolicy, ThumbnailParams};
pub use rust_backend::RustBackend;
