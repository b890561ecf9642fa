//! Validated board → dataset record.
//!
//! Fills defaults, derives byte counts from the size strings and attaches
//! the thumbnail. A board that declares an image but whose thumbnail cannot
//! be produced fails as a whole; it is never emitted without one.

use crate::size::{SizeError, parse_memory_size};
use crate::thumbnail::{
    ImageBackend, ImageFetcher, ImageOrigin, ThumbnailError, ThumbnailOutcome, Thumbnailer,
};
use crate::types::{Board, RawBoard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Value error in {field}: {source}")]
    Size {
        field: &'static str,
        #[source]
        source: SizeError,
    },
    #[error("Thumbnail for {url} failed after {attempts} attempts: {source}")]
    Thumbnail {
        url: String,
        attempts: u32,
        #[source]
        source: ThumbnailError,
    },
}

/// How the thumbnail of a normalized board was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStatus {
    None,
    Cached,
    Fetched,
}

/// A normalized board plus the reporting details that do not go in the
/// dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub board: Board,
    pub thumbnail: ThumbnailStatus,
    /// Attempts spent on the thumbnail (0 when there is no image).
    pub attempts: u32,
}

/// Normalize one validated board.
pub fn normalize<F: ImageFetcher, B: ImageBackend>(
    raw: RawBoard,
    thumbnails: &mut Thumbnailer<'_, F, B>,
) -> Result<Normalized, NormalizeError> {
    let flash_bytes = parse_memory_size(Some(&raw.flash)).map_err(|source| NormalizeError::Size {
        field: "flash",
        source,
    })?;
    let ram_bytes = parse_memory_size(Some(&raw.ram)).map_err(|source| NormalizeError::Size {
        field: "ram",
        source,
    })?;

    let (thumbnail, status, attempts) = match thumbnails.thumbnail(raw.image.as_deref()) {
        ThumbnailOutcome::NoImage => (None, ThumbnailStatus::None, 0),
        ThumbnailOutcome::Ready {
            data_uri,
            origin,
            attempts,
        } => {
            let status = match origin {
                ImageOrigin::Cache => ThumbnailStatus::Cached,
                ImageOrigin::Network => ThumbnailStatus::Fetched,
            };
            (Some(data_uri), status, attempts)
        }
        ThumbnailOutcome::Failed {
            attempts,
            last_error,
        } => {
            return Err(NormalizeError::Thumbnail {
                url: raw.image.unwrap_or_default(),
                attempts,
                source: last_error,
            });
        }
    };

    let board = Board {
        name: raw.name,
        chip: raw.chip,
        cores: raw.cores,
        flash: raw.flash,
        ram: raw.ram,
        usb: raw.usb,
        dimensions: raw.dimensions,
        connectivity: raw.connectivity,
        connectors: raw.connectors,
        smd: raw.smd,
        notes: raw.notes.unwrap_or_default(),
        image: raw.image,
        url: raw.url,
        flash_bytes,
        ram_bytes,
        thumbnail,
    };

    Ok(Normalized {
        board,
        thumbnail: status,
        attempts,
    })
}
