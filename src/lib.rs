pub mod analysis;
pub mod carving;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod io;
pub mod signatures;
pub mod types;

pub use carving::{CancellationToken, Carver, CarveStats, DescriptorBuilder, scan};
pub use config::ScanOptions;
pub use error::{CarveError, ResolveError, Result};
pub use io::{ByteSource, DiskImage};
pub use signatures::{SignatureCatalog, SignatureEntry};
pub use types::{FileDescriptor, FileType, NibbleOffset, Offset, OffsetUnits, SECTOR_SIZE};
