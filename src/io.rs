use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memchr::memmem;
use memmap2::Mmap;
use tracing::debug;

use crate::error::{CarveError, ResolveError, Result};
use crate::types::Offset;

/// Read-only view over the raw bytes of a disk image.
#[derive(Debug, Clone, Copy)]
pub struct ByteSource<'a> {
    data: &'a [u8],
}

impl<'a> ByteSource<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// First occurrence of `pattern` starting at or after `from`.
    pub fn find(&self, pattern: &[u8], from: Offset) -> Option<Offset> {
        let start = usize::try_from(from).ok()?;
        if start > self.data.len() {
            return None;
        }
        memmem::find(&self.data[start..], pattern).map(|pos| from + pos as u64)
    }

    /// Every occurrence of `pattern`, overlapping ones included.
    pub fn occurrences<'p>(&self, pattern: &'p [u8]) -> Occurrences<'a, 'p> {
        Occurrences {
            source: *self,
            finder: memmem::Finder::new(pattern),
            next: 0,
        }
    }

    /// Bytes `offset..offset + len`, or `OutOfBounds` if any of them is missing.
    pub fn slice(&self, offset: Offset, len: u64) -> std::result::Result<&'a [u8], ResolveError> {
        let out_of_bounds = ResolveError::OutOfBounds {
            offset,
            len,
            size: self.len(),
        };
        let end = offset.checked_add(len).ok_or(out_of_bounds)?;
        if end > self.len() {
            return Err(out_of_bounds);
        }
        Ok(&self.data[offset as usize..end as usize])
    }

    pub fn read_u16_le(&self, offset: Offset) -> std::result::Result<u16, ResolveError> {
        let bytes = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&self, offset: Offset) -> std::result::Result<u32, ResolveError> {
        let bytes = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl<'a> From<&'a [u8]> for ByteSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

/// Iterator over pattern matches; each search resumes one byte after the previous match.
pub struct Occurrences<'a, 'p> {
    source: ByteSource<'a>,
    finder: memmem::Finder<'p>,
    next: usize,
}

impl Iterator for Occurrences<'_, '_> {
    type Item = Offset;

    fn next(&mut self) -> Option<Offset> {
        let data = self.source.data;
        if self.next > data.len() {
            return None;
        }
        let pos = self.next + self.finder.find(&data[self.next..])?;
        self.next = pos + 1;
        Some(pos as u64)
    }
}

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// A disk image loaded once and kept resident for the whole scan.
pub struct DiskImage {
    backing: Backing,
}

impl DiskImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source| CarveError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        let size = file.metadata().map_err(unavailable)?.len();

        if size == 0 {
            debug!(path = %path.display(), "empty disk image");
            return Ok(Self::from_bytes(Vec::new()));
        }

        // SAFETY: the mapping is read-only and the image is not expected to change during a scan.
        let mmap = unsafe { Mmap::map(&file) }.map_err(unavailable)?;

        #[cfg(unix)]
        {
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }

        debug!(path = %path.display(), size, "mapped disk image");
        Ok(Self {
            backing: Backing::Mapped(mmap),
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            backing: Backing::Owned(data),
        }
    }

    #[inline]
    pub fn source(&self) -> ByteSource<'_> {
        ByteSource::new(self)
    }
}

impl Deref for DiskImage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(m) => m,
            Backing::Owned(v) => v,
        }
    }
}
