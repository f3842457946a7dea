use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::io::ByteSource;
use crate::signatures::SignatureEntry;
use crate::types::{FileType, Offset, OffsetUnits};

/// A header match before any validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub file_type: FileType,
    pub start: Offset,
}

/// A candidate that passed the start gate and had its end resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub file_type: FileType,
    pub start: Offset,
    pub end: Offset,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EntryCounts {
    pub candidates: usize,
    pub misaligned: usize,
    pub rejected: usize,
    pub unresolved: usize,
    pub out_of_bounds: usize,
}

#[inline]
pub fn is_sector_aligned(offset: Offset, sector_size: u64) -> bool {
    offset % sector_size == 0
}

/// Every occurrence of the entry's header, overlapping ones included, in ascending order.
pub fn candidates<'a>(
    source: ByteSource<'a>,
    entry: &'static SignatureEntry,
) -> impl Iterator<Item = Candidate> + 'a {
    let file_type = entry.file_type();
    source
        .occurrences(entry.header())
        .map(move |start| Candidate { file_type, start })
}

/// Resolves every acceptable candidate of one catalog entry.
///
/// Failed candidates are dropped; the returned spans are in ascending start order.
pub fn resolve_entry(
    source: ByteSource<'_>,
    entry: &'static SignatureEntry,
    sector_size: u64,
    units: OffsetUnits,
) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut counts = EntryCounts::default();

    for candidate in candidates(source, entry) {
        counts.candidates += 1;

        if !is_sector_aligned(candidate.start, sector_size) {
            counts.misaligned += 1;
            continue;
        }
        if !entry.resolver().accepts(source, candidate.start) {
            counts.rejected += 1;
            trace!(file_type = %candidate.file_type, start = candidate.start, "header rejected");
            continue;
        }

        match entry.resolver().resolve_end(source, candidate.start, units) {
            Ok(end) => spans.push(Span {
                file_type: candidate.file_type,
                start: candidate.start,
                end,
            }),
            Err(e) => {
                match e {
                    ResolveError::UnresolvedTrailer { .. } => counts.unresolved += 1,
                    ResolveError::OutOfBounds { .. } => counts.out_of_bounds += 1,
                }
                debug!(file_type = %candidate.file_type, start = candidate.start, "dropped: {}", e);
            }
        }
    }

    debug!(
        file_type = %entry.file_type(),
        candidates = counts.candidates,
        misaligned = counts.misaligned,
        rejected = counts.rejected,
        unresolved = counts.unresolved,
        out_of_bounds = counts.out_of_bounds,
        resolved = spans.len(),
        "signature scanned"
    );
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::SignatureCatalog;

    #[test]
    fn test_alignment() {
        assert!(is_sector_aligned(0, 512));
        assert!(is_sector_aligned(4096, 512));
        assert!(!is_sector_aligned(256, 512));
    }

    #[test]
    fn test_candidates_include_misaligned() {
        let mut data = vec![0u8; 2048];
        data[0..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        data[700..703].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        let entry = SignatureCatalog::standard().get(FileType::Jpg).unwrap();
        let starts: Vec<_> = candidates(ByteSource::new(&data), entry)
            .map(|c| c.start)
            .collect();
        assert_eq!(starts, vec![0, 700]);
    }

    #[test]
    fn test_resolve_entry_skips_unresolved() {
        let mut data = vec![0u8; 2048];
        data[0..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        data[100..102].copy_from_slice(&[0xFF, 0xD9]);
        data[1024..1027].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        let entry = SignatureCatalog::standard().get(FileType::Jpg).unwrap();
        let spans = resolve_entry(ByteSource::new(&data), entry, 512, OffsetUnits::Bytes);
        assert_eq!(
            spans,
            vec![Span {
                file_type: FileType::Jpg,
                start: 0,
                end: 103
            }]
        );
    }

    #[test]
    fn test_resolve_entry_avi_marker() {
        let mut data = vec![0u8; 2048];
        data[512..516].copy_from_slice(b"RIFF");
        data[516..520].copy_from_slice(&100u32.to_le_bytes());
        let entry = SignatureCatalog::standard().get(FileType::Avi).unwrap();
        let src = ByteSource::new(&data);
        assert!(resolve_entry(src, entry, 512, OffsetUnits::Bytes).is_empty());

        data[520..528].copy_from_slice(b"AVI LIST");
        let src = ByteSource::new(&data);
        let spans = resolve_entry(src, entry, 512, OffsetUnits::Bytes);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, 620);
        assert!(resolve_entry(src, entry, 1024, OffsetUnits::Bytes).is_empty());
    }
}
