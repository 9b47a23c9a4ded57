//! Layout Module
//!
//! Fixed binary shapes of the store file and their positions.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (64 bytes, offset 0)                             │
//! │   Name (32) | Version u32 | Count u32 | Capacity u32    │
//! │   Resized dims 4 x u16 | Reserved u32 | Reserved u64    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Metadata[0] (208 bytes, offset 64)                      │
//! │   PictureId (128) | SHA-256 (32) | OrigDims 2 x u32     │
//! │   Size 3 x u32 | Offset 3 x u64 | Valid u16 | Rsv u16   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Metadata[1] .. Metadata[capacity - 1]                   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Content region (append-only, offset 64 + capacity*208)  │
//! │   raw image bytes, addressed by Metadata offsets        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian and records are packed (no alignment
//! padding), so the sizes above are exact on every host.

mod header;
mod metadata;
mod resolution;

pub use header::StoreHeader;
pub use metadata::{MetadataRecord, Validity};
pub use resolution::{Resolution, NB_RES};

// =============================================================================
// Shared Constants
// =============================================================================

/// Longest store name in bytes (the field holds one more for the NUL)
pub const MAX_DB_NAME: usize = 31;

/// Longest picture id in bytes (the field holds one more for the NUL)
pub const MAX_PIC_ID: usize = 127;

/// Upper bound on the number of directory slots
pub const MAX_MAX_FILES: u32 = 100_000;

/// Header size: 32 + 4 + 4 + 4 + 8 + 4 + 8 = 64 bytes
pub const HEADER_SIZE: u64 = 64;

/// Metadata record size: 128 + 32 + 8 + 12 + 24 + 2 + 2 = 208 bytes
pub const METADATA_SIZE: u64 = 208;

/// File offset of the metadata record in `slot`
#[inline]
pub fn slot_offset(slot: usize) -> u64 {
    HEADER_SIZE + slot as u64 * METADATA_SIZE
}

/// File offset where the content region of a store with `capacity` slots begins
#[inline]
pub fn content_start(capacity: u32) -> u64 {
    HEADER_SIZE + capacity as u64 * METADATA_SIZE
}

// =============================================================================
// Field helpers (used by header and metadata)
// =============================================================================

/// Copy `s` into a NUL-padded fixed field.
///
/// The last byte always stays NUL; a longer `s` is cut at the nearest
/// char boundary that fits.
pub(crate) fn write_str(field: &mut [u8], s: &str) {
    field.fill(0);
    let mut len = s.len().min(field.len().saturating_sub(1));
    while !s.is_char_boundary(len) {
        len -= 1;
    }
    field[..len].copy_from_slice(&s.as_bytes()[..len]);
}

/// Read a NUL-terminated string out of a fixed field.
pub(crate) fn read_str(field: &[u8]) -> std::result::Result<String, std::string::FromUtf8Error> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8(field[..end].to_vec())
}

pub(crate) fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

pub(crate) fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(b)
}

pub(crate) fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(b)
}
