//! Deduplication Tests
//!
//! These tests verify:
//! - Identical content is stored once and shared
//! - Aliased entries keep their own ids and derived resolutions
//! - Deleting one alias leaves the other readable
//! - The pure decision functions over a directory

use pictdb::digest;
use pictdb::layout::{MetadataRecord, Validity};
use pictdb::store::{check_duplicate_id, decide, DedupDecision};
use pictdb::{PictDbError, Resolution};

#[path = "../common/mod.rs"]
mod common;

use common::{setup_temp_store, FakeResizer};

// =============================================================================
// Helper Functions
// =============================================================================

fn record(id: &str, content: &[u8], offset: u64) -> MetadataRecord {
    let mut record = MetadataRecord {
        picture_id: id.to_string(),
        content_hash: digest::hash(content),
        orig_dims: (640, 480),
        valid: Validity::NonEmpty,
        ..MetadataRecord::default()
    };
    record.set_location(Resolution::Orig, offset, content.len() as u32);
    record
}

// =============================================================================
// Store-level Behaviour
// =============================================================================

#[test]
fn test_identical_content_is_stored_once() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();
    let data = vec![0xabu8; 4096];

    store.insert(&data, "first", &resizer).unwrap();
    let content_after_first = store.content_len().unwrap();

    store.insert(&data, "second", &resizer).unwrap();

    assert_eq!(store.content_len().unwrap(), content_after_first);
    assert_eq!(store.count(), 2);
    assert_eq!(store.version(), 2);

    let first = store.slot(0).unwrap();
    let second = store.slot(1).unwrap();
    assert_eq!(
        first.location(Resolution::Orig),
        second.location(Resolution::Orig)
    );
    assert_eq!(first.content_hash, second.content_hash);
    assert_eq!(first.orig_dims, second.orig_dims);
}

#[test]
fn test_alias_skips_decoding() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();

    store.insert(b"same bytes", "a", &resizer).unwrap();
    store.insert(b"same bytes", "b", &resizer).unwrap();

    assert_eq!(resizer.decodes(), 1);
}

#[test]
fn test_aliases_read_the_same_bytes() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();

    store.insert(b"shared picture", "a", &resizer).unwrap();
    store.insert(b"shared picture", "b", &resizer).unwrap();

    let a = store.read("a", Resolution::Orig, &resizer).unwrap();
    let b = store.read("b", Resolution::Orig, &resizer).unwrap();
    assert_eq!(a, b"shared picture");
    assert_eq!(a, b);
}

#[test]
fn test_alias_derived_resolutions_are_per_slot() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();

    store.insert(b"shared", "a", &resizer).unwrap();
    store.read("a", Resolution::Thumb, &resizer).unwrap();
    store.insert(b"shared", "b", &resizer).unwrap();

    assert!(store.slot(0).unwrap().location(Resolution::Thumb).is_some());
    assert_eq!(store.slot(1).unwrap().location(Resolution::Thumb), None);
}

#[test]
fn test_different_content_is_appended() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();

    store.insert(b"one", "a", &resizer).unwrap();
    store.insert(b"two", "b", &resizer).unwrap();

    assert_eq!(store.content_len().unwrap(), 6);
    assert_ne!(
        store.slot(0).unwrap().location(Resolution::Orig),
        store.slot(1).unwrap().location(Resolution::Orig)
    );
}

#[test]
fn test_deleting_one_alias_keeps_the_other() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();
    store.insert(b"shared", "a", &resizer).unwrap();
    store.insert(b"shared", "b", &resizer).unwrap();

    store.delete("a").unwrap();

    assert_eq!(store.read("b", Resolution::Orig, &resizer).unwrap(), b"shared");
}

#[test]
fn test_deleted_content_is_not_aliased() {
    let (_temp, mut store) = setup_temp_store(5);
    let resizer = FakeResizer::new();
    store.insert(b"shared", "a", &resizer).unwrap();
    store.insert(b"filler", "f", &resizer).unwrap();
    store.delete("a").unwrap();
    let content_len = store.content_len().unwrap();

    store.insert(b"shared", "b", &resizer).unwrap();

    // The tombstone is never consulted, so the bytes are appended again
    assert_eq!(store.content_len().unwrap(), content_len + 6);
}

// =============================================================================
// Decision Functions
// =============================================================================

#[test]
fn test_decide_append_on_empty_directory() {
    let records = vec![MetadataRecord::default(); 3];
    assert_eq!(
        decide(&records, 0, &digest::hash(b"x")),
        DedupDecision::Append
    );
}

#[test]
fn test_decide_alias_reports_source_location() {
    let mut records = vec![MetadataRecord::default(); 4];
    records[2] = record("src", b"content", 5000);

    let decision = decide(&records, 0, &digest::hash(b"content"));

    assert_eq!(
        decision,
        DedupDecision::Alias {
            source: 2,
            offset: 5000,
            size: 7,
            orig_dims: (640, 480),
        }
    );
}

#[test]
fn test_decide_picks_first_match() {
    let mut records = vec![MetadataRecord::default(); 4];
    records[1] = record("x", b"content", 1000);
    records[3] = record("y", b"content", 2000);

    match decide(&records, 0, &digest::hash(b"content")) {
        DedupDecision::Alias { source, offset, .. } => {
            assert_eq!(source, 1);
            assert_eq!(offset, 1000);
        }
        other => panic!("Expected alias, got {:?}", other),
    }
}

#[test]
fn test_check_duplicate_id() {
    let mut records = vec![MetadataRecord::default(); 3];
    records[1] = record("taken", b"a", 1000);

    assert!(matches!(
        check_duplicate_id(&records, 0, "taken"),
        Err(PictDbError::DuplicateId(_))
    ));
    assert!(check_duplicate_id(&records, 0, "free").is_ok());
    // The slot being filled never clashes with itself
    assert!(check_duplicate_id(&records, 1, "taken").is_ok());

    records[1].valid = Validity::Empty;
    assert!(check_duplicate_id(&records, 0, "taken").is_ok());
}
