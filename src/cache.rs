//! Source image cache for thumbnail generation.
//!
//! Fetching board photos from vendor sites is slow and rate-limit-prone, and
//! every build is a full rebuild. This module keeps the raw downloaded bytes
//! on disk so later runs skip the network entirely.
//!
//! # Design
//!
//! ## Cache keys
//!
//! The cache is keyed by the **URL**, not the image content: the key is the
//! SHA-256 hex digest of the source URL string, computed before any fetch.
//! A lookup therefore never needs the network.
//!
//! ## What is stored
//!
//! Entries hold the original fetched bytes, not the rendered thumbnail. A
//! change to the thumbnail size or quality re-renders from the cached
//! original without downloading it again.
//!
//! ## Validity
//!
//! An entry that exists is trusted. There is no TTL, no revalidation and no
//! eviction; if a remote image changes behind the same URL, delete the
//! entry (or the whole cache directory) by hand.
//!
//! ## Storage
//!
//! One file per entry, named by the key, directly inside the cache
//! directory. Writes go to `<key>.part` first and are renamed into place, so
//! an interrupted run never leaves a truncated entry behind that later runs
//! would trust.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// URL-keyed store of fetched source images.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    /// Open the cache rooted at `dir`, creating the directory if absent.
    /// Existing entries are kept.
    pub fn open(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the entry for `url`, whether or not it exists.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(hash_url(url))
    }

    /// Read the cached bytes for `url`, or `None` on a miss.
    pub fn get(&self, url: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.entry_path(url);
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read(path).map(Some)
    }

    /// Store the fetched bytes for `url`.
    pub fn put(&self, url: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.entry_path(url);
        let partial = path.with_extension("part");
        std::fs::write(&partial, bytes)?;
        std::fs::rename(&partial, &path)
    }
}

/// SHA-256 hash of a source URL, returned as a hex string.
pub fn hash_url(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{:x}", digest)
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub fetches: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.fetches
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            write!(f, "no images")
        } else if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.fetches,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.fetches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // ImageCache
    // =========================================================================

    #[test]
    fn open_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested/cache");
        let cache = ImageCache::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.dir(), dir);
    }

    #[test]
    fn open_keeps_existing_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        cache.put("https://a/x.png", b"bytes").unwrap();

        let reopened = ImageCache::open(tmp.path()).unwrap();
        assert_eq!(
            reopened.get("https://a/x.png").unwrap(),
            Some(b"bytes".to_vec())
        );
    }

    #[test]
    fn get_miss_returns_none() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        assert_eq!(cache.get("https://a/missing.png").unwrap(), None);
    }

    #[test]
    fn put_then_get_hit() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        cache.put("https://a/x.png", &[1, 2, 3]).unwrap();
        assert_eq!(cache.get("https://a/x.png").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn entry_file_is_named_by_url_hash() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        cache.put("https://a/x.png", b"raw").unwrap();

        let expected = tmp.path().join(hash_url("https://a/x.png"));
        assert_eq!(fs::read(&expected).unwrap(), b"raw");
        assert!(!expected.with_extension("part").exists());
    }

    #[test]
    fn entries_are_trusted_without_revalidation() {
        let tmp = TempDir::new().unwrap();
        let cache = ImageCache::open(tmp.path()).unwrap();
        fs::write(cache.entry_path("https://a/x.png"), b"hand placed").unwrap();
        assert_eq!(
            cache.get("https://a/x.png").unwrap(),
            Some(b"hand placed".to_vec())
        );
    }

    // =========================================================================
    // hash_url
    // =========================================================================

    #[test]
    fn hash_url_deterministic() {
        let h1 = hash_url("https://example.com/board.jpg");
        let h2 = hash_url("https://example.com/board.jpg");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64); // SHA-256 hex is 64 chars
    }

    #[test]
    fn hash_url_varies_with_url() {
        assert_ne!(
            hash_url("https://example.com/a.jpg"),
            hash_url("https://example.com/b.jpg")
        );
    }

    #[test]
    fn hash_url_known_value() {
        assert_eq!(
            hash_url(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn cache_stats_display_with_hits() {
        let s = CacheStats {
            hits: 5,
            fetches: 2,
        };
        assert_eq!(format!("{}", s), "5 cached, 2 fetched (7 total)");
    }

    #[test]
    fn cache_stats_display_no_hits() {
        let mut s = CacheStats::default();
        s.fetch();
        s.fetch();
        assert_eq!(format!("{}", s), "2 fetched");
    }

    #[test]
    fn cache_stats_display_empty() {
        assert_eq!(format!("{}", CacheStats::default()), "no images");
    }
}
