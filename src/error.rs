use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Offset;

/// Errors surfaced to callers of the carver.
#[derive(Error, Debug)]
pub enum CarveError {
    #[error("Disk image unavailable: {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Scan cancelled after {completed} of {total} signature types")]
    Cancelled { completed: usize, total: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why a candidate was dropped. Never leaves the scanner.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No trailer found after offset {start}")]
    UnresolvedTrailer { start: Offset },

    #[error("Read of {len} bytes at offset {offset} exceeds image size {size}")]
    OutOfBounds { offset: Offset, len: u64, size: u64 },
}

pub type Result<T> = std::result::Result<T, CarveError>;
