//! Thumbnail generation: cache lookup, fetch, render, retry.
//!
//! [`Thumbnailer`] ties the [`ImageCache`], an [`ImageFetcher`] and an
//! [`ImageBackend`] together. One call to [`Thumbnailer::thumbnail`] runs
//! the whole sequence for a single source URL:
//!
//! ```text
//! url ─► cache hit? ──yes──────────────┐
//!          │ no                        ▼
//!          └─► fetch ─► store in cache ─► decode/flatten/resize/encode ─► data URI
//! ```
//!
//! Any failure along that path fails the attempt. Attempts repeat up to
//! [`RetryPolicy::attempts`] times with a fixed sleep in between; after the
//! last one the caller gets [`ThumbnailOutcome::Failed`] rather than an
//! error, and decides what that means for the record.

use super::backend::{BackendError, ImageBackend};
use super::fetch::{FetchError, ImageFetcher};
use super::params::{RetryPolicy, ThumbnailParams};
use crate::cache::{CacheStats, ImageCache};
use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of every generated thumbnail string.
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("cache error: {0}")]
    Cache(#[from] std::io::Error),
    #[error("{0}")]
    Backend(#[from] BackendError),
}

/// Where the source bytes of a thumbnail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    Cache,
    Network,
}

/// Result of asking for a thumbnail.
#[derive(Debug)]
pub enum ThumbnailOutcome {
    /// The record declares no image.
    NoImage,
    Ready {
        data_uri: String,
        origin: ImageOrigin,
        attempts: u32,
    },
    /// Every attempt failed; `last_error` is from the final one.
    Failed {
        attempts: u32,
        last_error: ThumbnailError,
    },
}

/// Wrap encoded JPEG bytes as an embeddable data URI.
pub fn encode_data_uri(jpeg: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
    format!("{DATA_URI_PREFIX}{encoded}")
}

/// Produces thumbnails for one build run.
pub struct Thumbnailer<'a, F: ImageFetcher, B: ImageBackend> {
    fetcher: &'a F,
    backend: &'a B,
    cache: &'a ImageCache,
    params: ThumbnailParams,
    retry: RetryPolicy,
    stats: CacheStats,
}

impl<'a, F: ImageFetcher, B: ImageBackend> Thumbnailer<'a, F, B> {
    pub fn new(
        fetcher: &'a F,
        backend: &'a B,
        cache: &'a ImageCache,
        params: ThumbnailParams,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            backend,
            cache,
            params,
            retry,
            stats: CacheStats::default(),
        }
    }

    /// Cache hits and network fetches so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Produce the thumbnail for `url`, retrying on failure.
    pub fn thumbnail(&mut self, url: Option<&str>) -> ThumbnailOutcome {
        let Some(url) = url else {
            return ThumbnailOutcome::NoImage;
        };

        let max_attempts = self.retry.attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(url) {
                Ok((data_uri, origin)) => {
                    return ThumbnailOutcome::Ready {
                        data_uri,
                        origin,
                        attempts: attempt,
                    };
                }
                Err(err) if attempt >= max_attempts => {
                    warn!(url, attempt, error = %err, "giving up on thumbnail");
                    return ThumbnailOutcome::Failed {
                        attempts: attempt,
                        last_error: err,
                    };
                }
                Err(err) => {
                    warn!(url, attempt, error = %err, "thumbnail attempt failed, retrying");
                    std::thread::sleep(self.retry.delay);
                }
            }
        }
    }

    fn attempt(&mut self, url: &str) -> Result<(String, ImageOrigin), ThumbnailError> {
        let (source, origin) = self.load_source(url)?;
        let jpeg = self.backend.thumbnail(&source, &self.params)?;
        Ok((encode_data_uri(&jpeg), origin))
    }

    fn load_source(&mut self, url: &str) -> Result<(Vec<u8>, ImageOrigin), ThumbnailError> {
        if let Some(bytes) = self.cache.get(url)? {
            debug!(url, bytes = bytes.len(), "image cache hit");
            self.stats.hit();
            return Ok((bytes, ImageOrigin::Cache));
        }

        debug!(url, "fetching image");
        let bytes = self.fetcher.fetch(url)?;
        self.cache.put(url, &bytes)?;
        self.stats.fetch();
        Ok((bytes, ImageOrigin::Network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_bytes;
    use crate::thumbnail::RustBackend;
    use crate::thumbnail::backend::tests::MockBackend;
    use crate::thumbnail::fetch::tests::MockFetcher;
    use std::time::Duration;
    use tempfile::TempDir;

    const URL: &str = "https://example.com/board.png";

    fn no_delay(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
        }
    }

    fn ready_uri(outcome: ThumbnailOutcome) -> String {
        match outcome {
            ThumbnailOutcome::Ready { data_uri, .. } => data_uri,
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn encode_data_uri_format() {
        assert_eq!(encode_data_uri(b"hi"), "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn absent_url_is_no_image() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new();
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        assert!(matches!(t.thumbnail(None), ThumbnailOutcome::NoImage));
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn miss_fetches_and_stores_raw_bytes() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new().route(URL, b"raw".to_vec());
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let outcome = t.thumbnail(Some(URL));
        assert!(matches!(
            outcome,
            ThumbnailOutcome::Ready {
                origin: ImageOrigin::Network,
                attempts: 1,
                ..
            }
        ));
        // Original bytes are cached, not the rendered thumbnail
        assert_eq!(cache.get(URL).unwrap(), Some(b"raw".to_vec()));
        assert_eq!(t.stats().fetches, 1);
    }

    #[test]
    fn hit_skips_network() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        cache.put(URL, b"cached").unwrap();
        let fetcher = MockFetcher::new();
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let uri = ready_uri(t.thumbnail(Some(URL)));
        assert_eq!(uri, encode_data_uri(b"thumb:cached"));
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(t.stats().hits, 1);
    }

    #[test]
    fn same_url_twice_fetches_once() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new().route(URL, b"raw".to_vec());
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let first = ready_uri(t.thumbnail(Some(URL)));
        let second = t.thumbnail(Some(URL));
        assert!(matches!(
            second,
            ThumbnailOutcome::Ready {
                origin: ImageOrigin::Cache,
                ..
            }
        ));
        assert_eq!(first, ready_uri(second));
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(t.stats().to_string(), "1 cached, 1 fetched (2 total)");
    }

    #[test]
    fn transient_failures_are_retried() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new()
            .route(URL, b"raw".to_vec())
            .failing_first(2);
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let outcome = t.thumbnail(Some(URL));
        assert!(matches!(
            outcome,
            ThumbnailOutcome::Ready { attempts: 3, .. }
        ));
        assert_eq!(fetcher.call_count(), 3);
    }

    #[test]
    fn exhausted_retries_is_failed_outcome() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new()
            .route(URL, b"raw".to_vec())
            .failing_first(3);
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        match t.thumbnail(Some(URL)) {
            ThumbnailOutcome::Failed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last_error, ThumbnailError::Fetch(_)));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(cache.get(URL).unwrap(), None);
    }

    #[test]
    fn decode_failure_is_retried_from_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new().route(URL, b"raw".to_vec());
        let backend = MockBackend::failing_first(1);
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let outcome = t.thumbnail(Some(URL));
        assert!(matches!(
            outcome,
            ThumbnailOutcome::Ready {
                origin: ImageOrigin::Cache,
                attempts: 2,
                ..
            }
        ));
        // Bytes were persisted on the first attempt, so the retry skipped the network
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(backend.call_count(), 2);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        let fetcher = MockFetcher::new();
        let backend = MockBackend::new();
        let mut t = Thumbnailer::new(
            &fetcher,
            &backend,
            &cache,
            ThumbnailParams::default(),
            no_delay(0),
        );

        assert!(matches!(
            t.thumbnail(Some(URL)),
            ThumbnailOutcome::Failed { attempts: 1, .. }
        ));
        assert_eq!(fetcher.call_count(), 1);
    }

    #[test]
    fn retried_result_matches_first_try_result() {
        let png = png_bytes(120, 80, [30, 120, 220, 255]);
        let backend = RustBackend::new();

        let tmp_a = TempDir::new().unwrap();
        let cache_a = ImageCache::open(tmp_a.path()).unwrap();
        let clean = MockFetcher::new().route(URL, png.clone());
        let mut first_try = Thumbnailer::new(
            &clean,
            &backend,
            &cache_a,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let tmp_b = TempDir::new().unwrap();
        let cache_b = ImageCache::open(tmp_b.path()).unwrap();
        let flaky = MockFetcher::new().route(URL, png).failing_first(2);
        let mut third_try = Thumbnailer::new(
            &flaky,
            &backend,
            &cache_b,
            ThumbnailParams::default(),
            no_delay(3),
        );

        let a = ready_uri(first_try.thumbnail(Some(URL)));
        let b = ready_uri(third_try.thumbnail(Some(URL)));
        assert!(a.starts_with(DATA_URI_PREFIX));
        assert_eq!(a, b);
    }
}
