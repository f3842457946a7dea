use super::FormatResolver;
use crate::error::ResolveError;
use crate::io::ByteSource;
use crate::types::{Offset, OffsetUnits};

pub const RIFF_SIGNATURE: [u8; 4] = *b"RIFF";
pub const AVI_MARKER: &[u8; 8] = b"AVI LIST";

const CHUNK_SIZE_OFFSET: u64 = 4;
const MARKER_OFFSET: u64 = 8;
/// The RIFF chunk size excludes the "RIFF" tag and the size field itself.
const RIFF_HEADER_LEN: u64 = 8;

#[derive(Debug, Default)]
pub struct AviResolver;

impl FormatResolver for AviResolver {
    fn accepts(&self, source: ByteSource<'_>, start: Offset) -> bool {
        source
            .slice(start + MARKER_OFFSET, AVI_MARKER.len() as u64)
            .is_ok_and(|marker| marker == AVI_MARKER)
    }

    fn resolve_end(
        &self,
        source: ByteSource<'_>,
        start: Offset,
        _units: OffsetUnits,
    ) -> Result<Offset, ResolveError> {
        let size = u64::from(source.read_u32_le(start + CHUNK_SIZE_OFFSET)?) + RIFF_HEADER_LEN;
        start.checked_add(size).ok_or(ResolveError::OutOfBounds {
            offset: start,
            len: size,
            size: source.len(),
        })
    }
}

pub static AVI: AviResolver = AviResolver;

#[cfg(test)]
mod tests {
    use super::*;

    fn riff(form: &[u8; 8], chunk_size: u32) -> Vec<u8> {
        let mut data = vec![0u8; 1024];
        data[..4].copy_from_slice(&RIFF_SIGNATURE);
        data[4..8].copy_from_slice(&chunk_size.to_le_bytes());
        data[8..16].copy_from_slice(form);
        data
    }

    #[test]
    fn test_riff_size_includes_header() {
        let data = riff(AVI_MARKER, 1000);
        let src = ByteSource::new(&data);
        assert!(AVI.accepts(src, 0));
        assert_eq!(AVI.resolve_end(src, 0, OffsetUnits::Bytes), Ok(1008));
    }

    #[test]
    fn test_wave_is_not_avi() {
        let data = riff(b"WAVEfmt ", 1000);
        let src = ByteSource::new(&data);
        assert!(!AVI.accepts(src, 0));
    }
}
