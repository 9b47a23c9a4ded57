//! Layout Tests
//!
//! These tests verify the bytes a store leaves on disk:
//! - Header and empty directory right after creation
//! - Record and header positions after an insert
//! - Content region offsets
//! - Rejection of corrupt files on open

use std::fs;

use pictdb::layout::{
    content_start, slot_offset, MetadataRecord, StoreHeader, HEADER_SIZE, METADATA_SIZE,
};
use pictdb::{CreateOptions, OpenMode, PictDbError, Resolution, Store, SyncStrategy};
use tempfile::TempDir;

#[path = "../common/mod.rs"]
mod common;

use common::{setup_temp_store, setup_temp_store_with, temp_store_path, FakeResizer};

// =============================================================================
// Helper Functions
// =============================================================================

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

fn u64_at(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(buf[at..at + 8].try_into().unwrap())
}

// =============================================================================
// Fresh Store
// =============================================================================

#[test]
fn test_created_file_size() {
    let (temp, store) = setup_temp_store(10);
    drop(store);

    let bytes = fs::read(temp_store_path(&temp)).unwrap();
    assert_eq!(bytes.len() as u64, HEADER_SIZE + 10 * METADATA_SIZE);
    assert_eq!(bytes.len() as u64, content_start(10));
}

#[test]
fn test_created_header_fields() {
    let options = CreateOptions::new(7).thumb(100, 80).small(300, 200);
    let (temp, store) = setup_temp_store_with(options);
    drop(store);

    let bytes = fs::read(temp_store_path(&temp)).unwrap();
    assert_eq!(&bytes[0..8], b"pics.db\0");
    assert!(bytes[8..32].iter().all(|&b| b == 0));
    assert_eq!(u32_at(&bytes, 32), 0, "version");
    assert_eq!(u32_at(&bytes, 36), 0, "count");
    assert_eq!(u32_at(&bytes, 40), 7, "capacity");
    assert_eq!(u16_at(&bytes, 44), 100);
    assert_eq!(u16_at(&bytes, 46), 80);
    assert_eq!(u16_at(&bytes, 48), 300);
    assert_eq!(u16_at(&bytes, 50), 200);
    assert!(bytes[52..64].iter().all(|&b| b == 0), "reserved fields");
}

#[test]
fn test_created_directory_is_zeroed() {
    let (temp, store) = setup_temp_store(4);
    drop(store);

    let bytes = fs::read(temp_store_path(&temp)).unwrap();
    assert!(bytes[HEADER_SIZE as usize..].iter().all(|&b| b == 0));
}

// =============================================================================
// After Insert
// =============================================================================

#[test]
fn test_insert_writes_record_at_slot_offset() {
    let (temp, mut store) = setup_temp_store(3);
    let resizer = FakeResizer::new();
    let data = b"not really a jpeg".to_vec();

    store.insert(&data, "first", &resizer).unwrap();
    store.insert(&data[..5], "second", &resizer).unwrap();
    store.close().unwrap();

    let bytes = fs::read(temp_store_path(&temp)).unwrap();

    let at = slot_offset(1) as usize;
    let record = &bytes[at..at + METADATA_SIZE as usize];
    assert_eq!(&record[0..7], b"second\0");
    assert_eq!(u32_at(record, 160), 800);
    assert_eq!(u32_at(record, 164), 600);
    assert_eq!(u32_at(record, 168), 0, "thumb size");
    assert_eq!(u32_at(record, 172), 0, "small size");
    assert_eq!(u32_at(record, 176), 5, "orig size");
    assert_eq!(
        u64_at(record, 196),
        content_start(3) + data.len() as u64,
        "orig offset follows the first picture"
    );
    assert_eq!(u16_at(record, 204), 1, "valid flag");

    assert_eq!(u32_at(&bytes, 32), 2, "version");
    assert_eq!(u32_at(&bytes, 36), 2, "count");
}

#[test]
fn test_content_region_holds_raw_bytes() {
    let (temp, mut store) = setup_temp_store(2);
    let resizer = FakeResizer::new();
    let data = b"0123456789".to_vec();

    store.insert(&data, "digits", &resizer).unwrap();
    let (offset, size) = store.slot(0).unwrap().location(Resolution::Orig).unwrap();
    store.close().unwrap();

    let bytes = fs::read(temp_store_path(&temp)).unwrap();
    assert_eq!(offset, content_start(2));
    assert_eq!(&bytes[offset as usize..offset as usize + size as usize], &data[..]);
}

#[test]
fn test_disk_record_decodes_to_memory_record() {
    let (temp, mut store) = setup_temp_store(2);
    store.insert(b"abc", "a", &FakeResizer::new()).unwrap();
    let in_memory = store.slot(0).unwrap().clone();
    store.close().unwrap();

    let bytes = fs::read(temp_store_path(&temp)).unwrap();
    let at = slot_offset(0) as usize;
    let buf: [u8; METADATA_SIZE as usize] =
        bytes[at..at + METADATA_SIZE as usize].try_into().unwrap();
    assert_eq!(MetadataRecord::decode(&buf).unwrap(), in_memory);

    let header: [u8; HEADER_SIZE as usize] = bytes[..HEADER_SIZE as usize].try_into().unwrap();
    let header = StoreHeader::decode(&header).unwrap();
    assert_eq!(header.count, 1);
    assert_eq!(header.name, "pics.db");
}

// =============================================================================
// Corrupt Files
// =============================================================================

#[test]
fn test_open_truncated_directory_fails() {
    let (temp, store) = setup_temp_store(5);
    drop(store);
    let path = temp_store_path(&temp);

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..(HEADER_SIZE + 2 * METADATA_SIZE) as usize]).unwrap();

    let result = Store::open(&path, OpenMode::ReadOnly, SyncStrategy::EveryWrite);
    assert!(matches!(result, Err(PictDbError::Io(_))));
}

#[test]
fn test_open_short_header_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp_store_path(&temp);
    fs::write(&path, [0u8; 10]).unwrap();

    let result = Store::open(&path, OpenMode::ReadOnly, SyncStrategy::EveryWrite);
    assert!(matches!(result, Err(PictDbError::Io(_))));
}

#[test]
fn test_open_oversized_capacity_fails() {
    let (temp, store) = setup_temp_store(1);
    drop(store);
    let path = temp_store_path(&temp);

    let mut bytes = fs::read(&path).unwrap();
    bytes[40..44].copy_from_slice(&200_000u32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let result = Store::open(&path, OpenMode::ReadOnly, SyncStrategy::EveryWrite);
    assert!(matches!(result, Err(PictDbError::InvalidArgument(_))));
}

#[test]
fn test_open_nonexistent_file_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.db");

    let result = Store::open(&path, OpenMode::ReadWrite, SyncStrategy::EveryWrite);
    assert!(matches!(result, Err(PictDbError::Io(_))));
}
