use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Offset = u64;

pub const SECTOR_SIZE: u64 = 512;

/// Container formats the carver knows, in catalog order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Mpg,
    Pdf,
    Bmp,
    Gif,
    Jpg,
    Docx,
    Avi,
    Png,
    Zip,
}

impl FileType {
    pub const ALL: [FileType; 9] = [
        FileType::Mpg,
        FileType::Pdf,
        FileType::Bmp,
        FileType::Gif,
        FileType::Jpg,
        FileType::Docx,
        FileType::Avi,
        FileType::Png,
        FileType::Zip,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Mpg => "mpg",
            FileType::Pdf => "pdf",
            FileType::Bmp => "bmp",
            FileType::Gif => "gif",
            FileType::Jpg => "jpg",
            FileType::Docx => "docx",
            FileType::Avi => "avi",
            FileType::Png => "png",
            FileType::Zip => "zip",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileType::Mpg => "MPG",
            FileType::Pdf => "PDF",
            FileType::Bmp => "BMP",
            FileType::Gif => "GIF",
            FileType::Jpg => "JPG",
            FileType::Docx => "DOCX",
            FileType::Avi => "AVI",
            FileType::Png => "PNG",
            FileType::Zip => "ZIP",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown file type '{0}'")]
pub struct ParseFileTypeError(pub String);

impl FromStr for FileType {
    type Err = ParseFileTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mpg" | "mpeg" => Ok(FileType::Mpg),
            "pdf" => Ok(FileType::Pdf),
            "bmp" => Ok(FileType::Bmp),
            "gif" => Ok(FileType::Gif),
            "jpg" | "jpeg" => Ok(FileType::Jpg),
            "docx" => Ok(FileType::Docx),
            "avi" => Ok(FileType::Avi),
            "png" => Ok(FileType::Png),
            "zip" => Ok(FileType::Zip),
            _ => Err(ParseFileTypeError(s.to_string())),
        }
    }
}

/// Unit in which trailer tail lengths are counted when computing an end offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnits {
    /// Tail lengths are byte counts past the trailer match.
    #[default]
    Bytes,
    /// Tail lengths are half-byte counts; the end is rounded up to a whole byte.
    Nibbles,
}

/// A position counted in half-bytes, as in a hex dump of the image.
///
/// Only converts to and from byte offsets; never mix with [`Offset`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NibbleOffset(u64);

impl NibbleOffset {
    #[inline]
    pub fn from_bytes(offset: Offset) -> Option<Self> {
        offset.checked_mul(2).map(Self)
    }

    #[inline]
    pub fn advance(self, nibbles: u64) -> Option<Self> {
        self.0.checked_add(nibbles).map(Self)
    }

    /// Byte offset covering this nibble, a trailing odd half-byte counting as a full byte.
    #[inline]
    pub fn to_bytes_ceil(self) -> Offset {
        self.0.div_ceil(2)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One carved file: where it starts and ends in the image and what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    pub sequence: u32,
    pub file_type: FileType,
    pub start: Offset,
    pub end: Offset,
    pub size: u64,
}

impl FileDescriptor {
    pub fn new(sequence: u32, file_type: FileType, start: Offset, end: Offset) -> Self {
        debug_assert!(end >= start);
        Self {
            sequence,
            file_type,
            start,
            end,
            size: end - start,
        }
    }

    pub fn extension(&self) -> &'static str {
        self.file_type.extension()
    }

    pub fn file_name(&self) -> String {
        format!("File{}.{}", self.sequence, self.extension())
    }
}
