//! Content deduplication
//!
//! Pure decisions over the directory: nothing here touches the file or
//! mutates a record. The insert path applies the outcome to the one slot
//! it is filling.

use crate::digest::{self, Digest};
use crate::error::{PictDbError, Result};
use crate::layout::{MetadataRecord, Resolution};

/// What to do with the ORIG bytes of a picture being inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupDecision {
    /// No valid slot holds the same content; append the bytes
    Append,

    /// `source` already stores identical content; reuse its ORIG range
    Alias {
        source: usize,
        offset: u64,
        size: u32,
        orig_dims: (u32, u32),
    },
}

/// Fail with `DuplicateId` if any valid slot other than `candidate` uses `id`
pub fn check_duplicate_id(records: &[MetadataRecord], candidate: usize, id: &str) -> Result<()> {
    let clash = records
        .iter()
        .enumerate()
        .any(|(i, r)| i != candidate && r.is_valid() && r.picture_id == id);
    if clash {
        return Err(PictDbError::DuplicateId(id.to_string()));
    }
    Ok(())
}

/// Decide between appending and aliasing for content hashing to `hash`
///
/// Every valid slot other than `candidate` is compared. Only the ORIG range
/// is shared; derived resolutions stay per-slot and are resized on demand.
pub fn decide(records: &[MetadataRecord], candidate: usize, hash: &Digest) -> DedupDecision {
    records
        .iter()
        .enumerate()
        .filter(|(i, r)| *i != candidate && r.is_valid())
        .find(|(_, r)| digest::equal(&r.content_hash, hash))
        .and_then(|(i, r)| {
            r.location(Resolution::Orig).map(|(offset, size)| DedupDecision::Alias {
                source: i,
                offset,
                size,
                orig_dims: r.orig_dims,
            })
        })
        .unwrap_or(DedupDecision::Append)
}
