use tracing::trace;

use super::{FormatResolver, tail_end};
use crate::error::ResolveError;
use crate::io::ByteSource;
use crate::types::{Offset, OffsetUnits};

/// A trailer pattern and how far past its first byte the file ends.
#[derive(Debug, Clone, Copy)]
pub struct Trailer {
    pub pattern: &'static [u8],
    pub tail: u64,
}

/// Ends a file at the first trailer found after its start.
///
/// Trailers are tried in order and the first one present anywhere after the
/// start wins, even if a later alternative occurs closer.
#[derive(Debug)]
pub struct TrailerResolver {
    trailers: &'static [Trailer],
}

impl TrailerResolver {
    pub const fn new(trailers: &'static [Trailer]) -> Self {
        Self { trailers }
    }

    pub fn trailers(&self) -> &'static [Trailer] {
        self.trailers
    }
}

impl FormatResolver for TrailerResolver {
    fn resolve_end(
        &self,
        source: ByteSource<'_>,
        start: Offset,
        units: OffsetUnits,
    ) -> Result<Offset, ResolveError> {
        let (at, trailer) = self
            .trailers
            .iter()
            .find_map(|t| source.find(t.pattern, start).map(|at| (at, t)))
            .ok_or(ResolveError::UnresolvedTrailer { start })?;

        trace!(start, at, tail = trailer.tail, "trailer matched");
        tail_end(source, at, trailer.tail, units)
    }
}

pub static MPG: TrailerResolver = TrailerResolver::new(&[
    Trailer {
        pattern: &[0x00, 0x00, 0x01, 0xB7],
        tail: 7,
    },
    Trailer {
        pattern: &[0x00, 0x00, 0x01, 0xB9],
        tail: 7,
    },
]);

pub static PDF: TrailerResolver = TrailerResolver::new(&[
    Trailer {
        pattern: b"\r%%EOF\r\x00\x00\x00",
        tail: 13,
    },
    Trailer {
        pattern: b"\r\n%%EOF\r\n\x00\x00\x00",
        tail: 17,
    },
    Trailer {
        pattern: b"\n%%EOF\n\x00\x00\x00",
        tail: 13,
    },
    Trailer {
        pattern: b"\n%%EOF\x00\x00\x00",
        tail: 11,
    },
]);

pub static GIF: TrailerResolver = TrailerResolver::new(&[Trailer {
    pattern: &[0x00, 0x3B, 0x00, 0x00, 0x00],
    tail: 3,
}]);

pub static JPG: TrailerResolver = TrailerResolver::new(&[Trailer {
    pattern: &[0xFF, 0xD9, 0x00, 0x00, 0x00],
    tail: 3,
}]);

pub static DOCX: TrailerResolver = TrailerResolver::new(&[Trailer {
    pattern: &[0x50, 0x4B, 0x05, 0x06],
    tail: 43,
}]);

pub static PNG: TrailerResolver = TrailerResolver::new(&[Trailer {
    pattern: &[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82],
    tail: 15,
}]);
