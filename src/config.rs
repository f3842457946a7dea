//! Scan options

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CarveError, Result};
use crate::signatures::SignatureCatalog;
use crate::types::{FileType, OffsetUnits, SECTOR_SIZE};

/// Options for a carving scan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// Start offsets must be a multiple of this
    pub sector_size: u64,
    /// File types to search for (empty = all)
    pub file_types: Vec<FileType>,
    /// Unit of trailer tail lengths
    pub offset_units: OffsetUnits,
    /// Scan catalog entries on the rayon pool
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            sector_size: SECTOR_SIZE,
            file_types: Vec::new(),
            offset_units: OffsetUnits::Bytes,
            parallel: false,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&text)
            .map_err(|e| CarveError::Config(format!("{}: {}", path.display(), e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sector_size == 0 {
            return Err(CarveError::Config("sector_size must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Sets the file types to search for
    pub fn with_types(mut self, types: Vec<FileType>) -> Self {
        self.file_types = types;
        self
    }

    pub fn with_sector_size(mut self, sector_size: u64) -> Self {
        self.sector_size = sector_size;
        self
    }

    pub fn with_offset_units(mut self, units: OffsetUnits) -> Self {
        self.offset_units = units;
        self
    }

    /// Enables parallel scanning
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn catalog(&self) -> SignatureCatalog {
        SignatureCatalog::only(&self.file_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = ScanOptions::default();
        assert_eq!(options.sector_size, 512);
        assert_eq!(options.offset_units, OffsetUnits::Bytes);
        assert_eq!(options.catalog().len(), 9);
    }

    #[test]
    fn test_from_json_partial() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"{{"file_types": ["zip", "docx"], "offset_units": "nibbles"}}"#).unwrap();
        temp.flush().unwrap();

        let options = ScanOptions::from_json_file(temp.path()).unwrap();
        assert_eq!(options.sector_size, 512);
        assert_eq!(options.offset_units, OffsetUnits::Nibbles);
        assert_eq!(options.file_types, vec![FileType::Zip, FileType::Docx]);
    }

    #[test]
    fn test_from_json_rejects_zero_sector() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"{{"sector_size": 0}}"#).unwrap();
        temp.flush().unwrap();

        let err = ScanOptions::from_json_file(temp.path()).unwrap_err();
        assert!(matches!(err, CarveError::Config(_)));
    }

    #[test]
    fn test_from_json_unknown_key() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"{{"chunk_size": 4}}"#).unwrap();
        temp.flush().unwrap();

        assert!(ScanOptions::from_json_file(temp.path()).is_err());
    }
}
