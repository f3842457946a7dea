use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::carving::CancellationToken;
use crate::error::Result;
use crate::types::FileDescriptor;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFile {
    #[serde(flatten)]
    pub descriptor: FileDescriptor,
    pub path: PathBuf,
    pub bytes_written: u64,
    pub sha256: String,
    /// The descriptor ran past the end of the image and was cut short.
    pub truncated: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct ExtractionReport {
    pub extracted: Vec<ExtractedFile>,
    pub failed: usize,
    /// Extraction stopped early because the token was cancelled.
    pub cancelled: bool,
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Bytes of `image` covered by the descriptor, clamped to the image length.
pub fn carved_bytes<'a>(descriptor: &FileDescriptor, image: &'a [u8]) -> &'a [u8] {
    let len = image.len() as u64;
    let start = descriptor.start.min(len) as usize;
    let end = descriptor.end.min(len) as usize;
    &image[start..end]
}

pub fn extract_single(
    descriptor: &FileDescriptor,
    image: &[u8],
    output_path: &Path,
) -> Result<ExtractedFile> {
    let data = carved_bytes(descriptor, image);
    let truncated = (data.len() as u64) < descriptor.size;

    let mut out = File::create(output_path)?;
    out.write_all(data)?;
    out.sync_all()?;

    if truncated {
        warn!(
            file = %descriptor.file_name(),
            expected = descriptor.size,
            written = data.len(),
            "carved range runs past end of image"
        );
    }

    Ok(ExtractedFile {
        descriptor: *descriptor,
        path: output_path.to_path_buf(),
        bytes_written: data.len() as u64,
        sha256: sha256_hex(data),
        truncated,
    })
}

/// Writes each descriptor to `output_dir/File<n>.<ext>` and hashes it.
///
/// A failure on one file is logged and counted; the rest are still extracted.
/// The token is checked before each file; files written before cancellation stay
/// in the report.
pub fn extract_all(
    descriptors: &[FileDescriptor],
    image: &[u8],
    output_dir: &Path,
    cancel: &CancellationToken,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Result<ExtractionReport> {
    fs::create_dir_all(output_dir)?;

    let mut report = ExtractionReport::default();
    let total = descriptors.len();

    for (i, descriptor) in descriptors.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(completed = i, total, "extraction cancelled");
            report.cancelled = true;
            break;
        }
        let output_path = output_dir.join(descriptor.file_name());

        match extract_single(descriptor, image, &output_path) {
            Ok(file) => {
                debug!(path = %file.path.display(), bytes = file.bytes_written, "extracted");
                report.extracted.push(file);
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", descriptor.file_name(), e);
                report.failed += 1;
            }
        }

        if let Some(cb) = progress {
            cb(i + 1, total);
        }
    }
    Ok(report)
}
