use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use carver::extraction::{self, ExtractionReport};
use carver::{
    CancellationToken, Carver, CarveStats, DiskImage, FileDescriptor, FileType, OffsetUnits,
    ScanOptions,
};

#[derive(Parser)]
#[command(name = "carver")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recover files from a raw disk image by signature carving")]
struct Cli {
    /// Raw disk image (dd) to scan
    image: PathBuf,

    /// Directory for recovered files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Only look for these types (e.g. pdf,jpg,zip)
    #[arg(short = 't', long, value_delimiter = ',')]
    types: Option<Vec<FileType>>,

    /// JSON file with scan options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Count trailer tail lengths in half-bytes
    #[arg(long)]
    nibble_offsets: bool,

    /// Scan signature types in parallel
    #[arg(long)]
    parallel: bool,

    /// Only list offsets, do not write recovered files
    #[arg(long)]
    no_extract: bool,

    /// Write a JSON report of the results
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Report<'a> {
    Listed { files: &'a [FileDescriptor] },
    Extracted(&'a ExtractionReport),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to set Ctrl+C handler")?;

    let options = build_options(&cli)?;

    println!("Opening disk image {}", cli.image.display());
    let image = DiskImage::open(&cli.image)
        .with_context(|| format!("Failed to open disk image {:?}", cli.image))?;

    println!("Searching for files. Large images may take a moment.");
    let carver = Carver::new(options).with_cancellation(cancel.clone());
    let descriptors = carver.scan(image.source())?;

    let stats = CarveStats::from_descriptors(&descriptors);
    println!();
    println!("Found {} files:", stats.total_files());
    for (file_type, count) in stats.iter() {
        println!("{:<5} {}", file_type, count);
    }
    println!();

    if cli.no_extract {
        for d in &descriptors {
            print_file_info(d);
        }
        if let Some(path) = &cli.report {
            write_report(path, &Report::Listed { files: &descriptors })?;
        }
        return Ok(());
    }

    let report = extract(&descriptors, &image, &cli.output, &cancel)?;
    for file in &report.extracted {
        print_file_info(&file.descriptor);
        println!("SHA-256: {}  {}", file.sha256, file.path.display());
    }
    if report.failed > 0 {
        println!("Failed: {}", report.failed);
    }
    if report.cancelled {
        println!(
            "Extraction interrupted after {} of {} files",
            report.extracted.len() + report.failed,
            descriptors.len()
        );
    }

    if let Some(path) = &cli.report {
        write_report(path, &Report::Extracted(&report))?;
    }

    println!();
    println!("Recovered files are in {}", cli.output.display());
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(cli: &Cli) -> Result<ScanOptions> {
    let mut options = match &cli.config {
        Some(path) => ScanOptions::from_json_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => ScanOptions::default(),
    };

    if let Some(types) = &cli.types {
        options = options.with_types(types.clone());
    }
    if cli.nibble_offsets {
        options = options.with_offset_units(OffsetUnits::Nibbles);
    }
    if cli.parallel {
        options = options.parallel();
    }
    info!(?options, "scan options");
    Ok(options)
}

fn extract(
    descriptors: &[FileDescriptor],
    image: &[u8],
    output: &Path,
    cancel: &CancellationToken,
) -> Result<ExtractionReport> {
    let pb = ProgressBar::new(descriptors.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/white}] {pos}/{len} ({percent}%)")?
            .progress_chars("=>-"),
    );

    let progress_cb = |current: usize, _total: usize| {
        pb.set_position(current as u64);
    };

    let report = extraction::extract_all(descriptors, image, output, cancel, Some(&progress_cb))
        .with_context(|| format!("Failed to extract into {:?}", output))?;
    pb.finish_and_clear();
    Ok(report)
}

fn print_file_info(d: &FileDescriptor) {
    println!(
        "{}, Start Offset: {:#x}, End Offset: {:#x}",
        d.file_name(),
        d.start,
        d.end
    );
}

fn write_report(path: &Path, report: &Report<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("Failed to write report {:?}", path))?;
    Ok(())
}
