use super::FormatResolver;
use crate::error::ResolveError;
use crate::io::ByteSource;
use crate::types::{Offset, OffsetUnits};

pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

const SIZE_FIELD_OFFSET: u64 = 4;
const RESERVED_OFFSET: u64 = 6;
const RESERVED_LEN: u64 = 4;

/// Sizes a bitmap from the file-size field of its header.
#[derive(Debug, Default)]
pub struct BmpResolver;

impl FormatResolver for BmpResolver {
    fn accepts(&self, source: ByteSource<'_>, start: Offset) -> bool {
        source
            .slice(start + RESERVED_OFFSET, RESERVED_LEN)
            .is_ok_and(|reserved| reserved.iter().all(|&b| b == 0))
    }

    fn resolve_end(
        &self,
        source: ByteSource<'_>,
        start: Offset,
        _units: OffsetUnits,
    ) -> Result<Offset, ResolveError> {
        let size = u64::from(source.read_u32_le(start + SIZE_FIELD_OFFSET)?);
        start.checked_add(size).ok_or(ResolveError::OutOfBounds {
            offset: start,
            len: size,
            size: source.len(),
        })
    }
}

pub static BMP: BmpResolver = BmpResolver;

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_at(offset: usize, reserved: [u8; 4]) -> Vec<u8> {
        let mut data = vec![0u8; 2048];
        data[offset..offset + 2].copy_from_slice(&BMP_SIGNATURE);
        data[offset + 4..offset + 8].copy_from_slice(&[0x00, 0x04, 0x00, 0x00]);
        data[offset + 6..offset + 10].copy_from_slice(&reserved);
        data
    }

    #[test]
    fn test_size_field() {
        let data = bitmap_at(512, [0; 4]);
        let src = ByteSource::new(&data);
        assert!(BMP.accepts(src, 512));
        assert_eq!(BMP.resolve_end(src, 512, OffsetUnits::Bytes), Ok(1536));
    }

    #[test]
    fn test_reserved_must_be_zero() {
        let data = bitmap_at(512, [0, 0, 1, 0]);
        let src = ByteSource::new(&data);
        assert!(!BMP.accepts(src, 512));
    }

    #[test]
    fn test_end_may_exceed_image() {
        let mut data = vec![0u8; 16];
        data[..2].copy_from_slice(&BMP_SIGNATURE);
        data[4..8].copy_from_slice(&[0x00, 0x10, 0x00, 0x00]);
        let src = ByteSource::new(&data);
        assert_eq!(BMP.resolve_end(src, 0, OffsetUnits::Bytes), Ok(4096));
    }

    #[test]
    fn test_truncated_header() {
        let data = BMP_SIGNATURE;
        let src = ByteSource::new(&data);
        assert!(!BMP.accepts(src, 0));
        assert!(BMP.resolve_end(src, 0, OffsetUnits::Bytes).is_err());
    }
}
