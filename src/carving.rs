use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::info;

use crate::analysis::{Span, resolve_entry};
use crate::config::ScanOptions;
use crate::error::{CarveError, Result};
use crate::io::ByteSource;
use crate::signatures::SignatureCatalog;
use crate::types::{FileDescriptor, FileType, Offset, OffsetUnits, SECTOR_SIZE};

/// Numbers descriptors as they are accepted.
///
/// Sequence numbers start at 1 and grow by one per descriptor, across all types.
#[derive(Debug)]
pub struct DescriptorBuilder {
    next_sequence: u32,
    descriptors: Vec<FileDescriptor>,
}

impl DescriptorBuilder {
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            descriptors: Vec::new(),
        }
    }

    pub fn push(&mut self, file_type: FileType, start: Offset, end: Offset) -> &FileDescriptor {
        let descriptor = FileDescriptor::new(self.next_sequence, file_type, start, end);
        self.next_sequence += 1;
        self.descriptors.push(descriptor);
        &self.descriptors[self.descriptors.len() - 1]
    }

    pub fn extend(&mut self, spans: impl IntoIterator<Item = Span>) {
        for span in spans {
            self.push(span.file_type, span.start, span.end);
        }
    }

    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn finish(self) -> Vec<FileDescriptor> {
        self.descriptors
    }
}

impl Default for DescriptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared flag that stops a scan before its next catalog entry.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scans `source` for every entry of `catalog` with 512-byte sectors and byte tail lengths.
pub fn scan(source: ByteSource<'_>, catalog: &SignatureCatalog) -> Vec<FileDescriptor> {
    let mut builder = DescriptorBuilder::new();
    for &entry in catalog.entries() {
        builder.extend(resolve_entry(source, entry, SECTOR_SIZE, OffsetUnits::Bytes));
    }
    builder.finish()
}

pub struct Carver {
    options: ScanOptions,
    catalog: SignatureCatalog,
    cancel: CancellationToken,
}

impl Carver {
    pub fn new(options: ScanOptions) -> Self {
        let catalog = options.catalog();
        Self {
            options,
            catalog,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: SignatureCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn catalog(&self) -> &SignatureCatalog {
        &self.catalog
    }

    pub fn scan(&self, source: ByteSource<'_>) -> Result<Vec<FileDescriptor>> {
        self.options.validate()?;
        info!(
            size = source.len(),
            types = self.catalog.len(),
            parallel = self.options.parallel,
            "starting scan"
        );

        let descriptors = if self.options.parallel {
            self.scan_parallel(source)?
        } else {
            self.scan_sequential(source)?
        };

        info!(found = descriptors.len(), "scan complete");
        Ok(descriptors)
    }

    fn scan_sequential(&self, source: ByteSource<'_>) -> Result<Vec<FileDescriptor>> {
        let total = self.catalog.len();
        let mut builder = DescriptorBuilder::new();

        for (completed, &entry) in self.catalog.entries().iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(CarveError::Cancelled { completed, total });
            }
            let spans = resolve_entry(
                source,
                entry,
                self.options.sector_size,
                self.options.offset_units,
            );
            info!(file_type = %entry.file_type(), found = spans.len(), "signature done");
            builder.extend(spans);
        }

        Ok(builder.finish())
    }

    /// One rayon task per catalog entry; numbering happens afterwards in catalog order.
    fn scan_parallel(&self, source: ByteSource<'_>) -> Result<Vec<FileDescriptor>> {
        let total = self.catalog.len();

        let per_type: Vec<Option<Vec<Span>>> = self
            .catalog
            .entries()
            .par_iter()
            .map(|&entry| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                Some(resolve_entry(
                    source,
                    entry,
                    self.options.sector_size,
                    self.options.offset_units,
                ))
            })
            .collect();

        let mut builder = DescriptorBuilder::new();
        for (completed, spans) in per_type.into_iter().enumerate() {
            match spans {
                Some(spans) => builder.extend(spans),
                None => return Err(CarveError::Cancelled { completed, total }),
            }
        }
        Ok(builder.finish())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CarveStats {
    counts: [usize; FileType::ALL.len()],
}

impl CarveStats {
    pub fn from_descriptors(descriptors: &[FileDescriptor]) -> Self {
        let mut stats = Self::default();
        for d in descriptors {
            stats.counts[d.file_type as usize] += 1;
        }
        stats
    }

    pub fn count(&self, file_type: FileType) -> usize {
        self.counts[file_type as usize]
    }

    pub fn total_files(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Types with at least one descriptor, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (FileType, usize)> + '_ {
        FileType::ALL
            .iter()
            .map(|&t| (t, self.count(t)))
            .filter(|&(_, n)| n > 0)
    }
}
