use std::fmt;

use crate::formats::{FormatResolver, avi, bmp, trailer, zip};
use crate::types::FileType;

pub const MPG_SIGNATURE: [u8; 4] = [0x00, 0x00, 0x01, 0xB3];
pub const PDF_SIGNATURE: [u8; 4] = *b"%PDF";
pub const GIF_SIGNATURE: [u8; 6] = *b"GIF89a";
pub const JPG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];
pub const DOCX_SIGNATURE: [u8; 8] = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x06, 0x00];
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// Local file header. A strict prefix of [`DOCX_SIGNATURE`].
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// A container format's start signature and the strategy that finds its end.
pub struct SignatureEntry {
    file_type: FileType,
    header: &'static [u8],
    resolver: &'static dyn FormatResolver,
}

impl SignatureEntry {
    pub const fn new(
        file_type: FileType,
        header: &'static [u8],
        resolver: &'static dyn FormatResolver,
    ) -> Self {
        Self {
            file_type,
            header,
            resolver,
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn header(&self) -> &'static [u8] {
        self.header
    }

    pub fn resolver(&self) -> &'static dyn FormatResolver {
        self.resolver
    }
}

impl fmt::Debug for SignatureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureEntry")
            .field("file_type", &self.file_type)
            .field("header", &hex::encode(self.header))
            .finish_non_exhaustive()
    }
}

static STANDARD: [SignatureEntry; 9] = [
    SignatureEntry::new(FileType::Mpg, &MPG_SIGNATURE, &trailer::MPG),
    SignatureEntry::new(FileType::Pdf, &PDF_SIGNATURE, &trailer::PDF),
    SignatureEntry::new(FileType::Bmp, &bmp::BMP_SIGNATURE, &bmp::BMP),
    SignatureEntry::new(FileType::Gif, &GIF_SIGNATURE, &trailer::GIF),
    SignatureEntry::new(FileType::Jpg, &JPG_SIGNATURE, &trailer::JPG),
    SignatureEntry::new(FileType::Docx, &DOCX_SIGNATURE, &trailer::DOCX),
    SignatureEntry::new(FileType::Avi, &avi::RIFF_SIGNATURE, &avi::AVI),
    SignatureEntry::new(FileType::Png, &PNG_SIGNATURE, &trailer::PNG),
    SignatureEntry::new(FileType::Zip, &ZIP_SIGNATURE, &zip::ZIP),
];

/// Fixed-order list of the formats a scan looks for.
///
/// Order matters: descriptors are numbered catalog entry by catalog entry.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    entries: Vec<&'static SignatureEntry>,
}

impl SignatureCatalog {
    /// All supported formats: MPG, PDF, BMP, GIF, JPG, DOCX, AVI, PNG, ZIP.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD.iter().collect(),
        }
    }

    /// The standard catalog restricted to `types`, keeping catalog order.
    /// An empty slice selects everything.
    pub fn only(types: &[FileType]) -> Self {
        if types.is_empty() {
            return Self::standard();
        }
        Self {
            entries: STANDARD
                .iter()
                .filter(|e| types.contains(&e.file_type))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[&'static SignatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, file_type: FileType) -> Option<&'static SignatureEntry> {
        self.entries.iter().copied().find(|e| e.file_type == file_type)
    }
}

impl Default for SignatureCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
