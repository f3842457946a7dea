//! End-of-file resolution, one strategy per container format.
//!
//! A resolver gets a start offset that already passed the sector-alignment
//! gate and decides where the embedded file ends. Formats with a trailer
//! search forward for it; BMP and AVI read a size field from their header.

pub mod avi;
pub mod bmp;
pub mod trailer;
pub mod zip;

use crate::error::ResolveError;
use crate::io::ByteSource;
use crate::types::{NibbleOffset, Offset, OffsetUnits};

pub use avi::AviResolver;
pub use bmp::BmpResolver;
pub use trailer::{Trailer, TrailerResolver};
pub use zip::ZipResolver;

pub trait FormatResolver: Send + Sync {
    /// Structural check on the header beyond sector alignment.
    fn accepts(&self, _source: ByteSource<'_>, _start: Offset) -> bool {
        true
    }

    /// Exclusive end offset of the file starting at `start`.
    fn resolve_end(
        &self,
        source: ByteSource<'_>,
        start: Offset,
        units: OffsetUnits,
    ) -> Result<Offset, ResolveError>;
}

/// End offset `tail` units past a trailer match at `at`, which must lie inside the image.
pub(crate) fn tail_end(
    source: ByteSource<'_>,
    at: Offset,
    tail: u64,
    units: OffsetUnits,
) -> Result<Offset, ResolveError> {
    let end = match units {
        OffsetUnits::Bytes => at.checked_add(tail),
        OffsetUnits::Nibbles => NibbleOffset::from_bytes(at)
            .and_then(|n| n.advance(tail))
            .map(NibbleOffset::to_bytes_ceil),
    };

    match end {
        Some(end) if end <= source.len() => Ok(end),
        _ => Err(ResolveError::OutOfBounds {
            offset: at,
            len: end.map_or(u64::MAX, |e| e - at),
            size: source.len(),
        }),
    }
}
