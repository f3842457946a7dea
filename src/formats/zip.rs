use tracing::trace;

use super::{FormatResolver, tail_end};
use crate::error::ResolveError;
use crate::io::ByteSource;
use crate::types::{Offset, OffsetUnits};

pub const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
pub const EOCD_SIZE: u64 = 22;
const COMMENT_LEN_OFFSET: u64 = 20;

/// Ends a ZIP archive after its End Of Central Directory record and comment.
#[derive(Debug, Default)]
pub struct ZipResolver;

impl FormatResolver for ZipResolver {
    fn resolve_end(
        &self,
        source: ByteSource<'_>,
        start: Offset,
        units: OffsetUnits,
    ) -> Result<Offset, ResolveError> {
        let eocd = source
            .find(&EOCD_SIGNATURE, start)
            .ok_or(ResolveError::UnresolvedTrailer { start })?;

        let comment_len = u64::from(source.read_u16_le(eocd + COMMENT_LEN_OFFSET)?);
        trace!(start, eocd, comment_len, "end of central directory");

        let tail = match units {
            OffsetUnits::Bytes => EOCD_SIZE + comment_len,
            OffsetUnits::Nibbles => EOCD_SIZE + 2 * comment_len,
        };
        tail_end(source, eocd, tail, units)
    }
}

pub static ZIP: ZipResolver = ZipResolver;
