use std::fs;
use std::io::Write;

use tempfile::{NamedTempFile, tempdir};

use carver::extraction::{extract_all, sha256_hex};
use carver::{CancellationToken, Carver, DiskImage, FileType, ScanOptions};

fn create_test_disk() -> Vec<u8> {
    let mut disk = vec![0u8; 8192];

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
    while jpeg.len() < 700 {
        let idx = jpeg.len();
        jpeg.push(((idx.wrapping_mul(131).wrapping_add(17)) % 251) as u8 | 0x01);
    }
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    disk[1024..1024 + jpeg.len()].copy_from_slice(&jpeg);

    disk[4096..4098].copy_from_slice(b"BM");
    disk[4100..4104].copy_from_slice(&[0x00, 0x01, 0x00, 0x00]);
    disk
}

#[test]
fn test_full_recovery_pipeline() {
    let dir = tempdir().unwrap();
    let disk_path = dir.path().join("test_disk.dd");
    let output_dir = dir.path().join("recovered");
    let disk = create_test_disk();
    fs::write(&disk_path, &disk).unwrap();

    let image = DiskImage::open(&disk_path).unwrap();
    let descriptors = Carver::new(ScanOptions::default())
        .scan(image.source())
        .unwrap();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].file_type, FileType::Bmp);
    assert_eq!(descriptors[1].file_type, FileType::Jpg);

    let cancel = CancellationToken::new();
    let report = extract_all(&descriptors, &image, &output_dir, &cancel, None).unwrap();
    assert_eq!(report.failed, 0);
    assert!(!report.cancelled);
    assert_eq!(report.extracted.len(), 2);

    let bmp = &report.extracted[0];
    assert_eq!(bmp.path, output_dir.join("File1.bmp"));
    assert_eq!(bmp.bytes_written, 256);
    assert!(!bmp.truncated);

    let jpg = &report.extracted[1];
    assert_eq!(jpg.path, output_dir.join("File2.jpg"));
    let written = fs::read(&jpg.path).unwrap();
    assert_eq!(written, &disk[1024..1024 + 703]);
    assert_eq!(jpg.sha256, sha256_hex(&written));
}

#[test]
fn test_progress_callback() {
    let dir = tempdir().unwrap();
    let disk = create_test_disk();
    let image = DiskImage::from_bytes(disk);
    let descriptors = Carver::new(ScanOptions::default())
        .scan(image.source())
        .unwrap();

    let seen = std::cell::RefCell::new(Vec::new());
    let cb = |current: usize, total: usize| seen.borrow_mut().push((current, total));
    let cancel = CancellationToken::new();
    extract_all(&descriptors, &image, dir.path(), &cancel, Some(&cb)).unwrap();

    assert_eq!(*seen.borrow(), vec![(1, 2), (2, 2)]);
}

#[test]
fn test_empty_image() {
    let temp = NamedTempFile::new().unwrap();
    let image = DiskImage::open(temp.path()).unwrap();
    let descriptors = Carver::new(ScanOptions::default())
        .scan(image.source())
        .unwrap();
    assert!(descriptors.is_empty());
}

#[test]
fn test_mapped_image_matches_owned() {
    let disk = create_test_disk();
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(&disk).unwrap();
    temp.flush().unwrap();

    let mapped = DiskImage::open(temp.path()).unwrap();
    let owned = DiskImage::from_bytes(disk);
    let carver = Carver::new(ScanOptions::default());
    assert_eq!(
        carver.scan(mapped.source()).unwrap(),
        carver.scan(owned.source()).unwrap()
    );
}
