//! # Boardgen
//!
//! A catalog generator for microcontroller development boards. Each board
//! is described by one YAML file; the generator validates them all, turns
//! them into a single JSON dataset with derived byte counts and embedded
//! thumbnails, and places it next to a copy of a static page template.
//!
//! # Architecture: Validate, Normalize, Write
//!
//! ```text
//! boards/*.yaml ─► validate ─► normalize (+ thumbnail) ─► out/board_data.json
//! page_template/ ────────────────────────────────────────► out/
//! ```
//!
//! Every phase runs over the whole batch before the next one starts, and a
//! single failure anywhere stops the build before anything is written. The
//! output directory is rebuilt from scratch on every run; the thumbnail
//! source cache is not, so unchanged input rebuilds byte-identically without
//! touching the network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrates discovery, validation, normalization and output |
//! | [`validate`] | YAML parsing and schema checks for one board file |
//! | [`normalize`] | Validated board → dataset record (byte counts, defaults, thumbnail) |
//! | [`thumbnail`] | Fetch, cache, resize and JPEG-encode board images with retry |
//! | [`cache`] | On-disk store of raw source images keyed by URL hash |
//! | [`size`] | `"520KB"` → `532480` memory size parsing |
//! | [`types`] | Board records and the dataset envelope |
//! | [`config`] | `boardgen.toml` loading and validation |
//! | [`output`] | CLI output formatting for pipeline progress |
//!
//! # Design Decisions
//!
//! ## Strict Schema
//!
//! Board files are deserialized with `deny_unknown_fields` into closed enums
//! for USB type, radios and connectors. A typo in a key or a tag fails the
//! build instead of silently producing a record the page cannot filter on.
//!
//! ## Thumbnails Inline
//!
//! Thumbnails are embedded in the dataset as `data:` URIs, so the page
//! template needs no image hosting and the output directory stays a single
//! JSON file plus static assets.
//!
//! ## URL-Keyed Cache
//!
//! The cache stores the original downloaded bytes under the SHA-256 of the
//! URL, not of the content. Presence means valid; there is no expiry. Delete
//! an entry (or the whole directory) to force a fresh download.

pub mod cache;
pub mod config;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod size;
pub mod thumbnail;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
