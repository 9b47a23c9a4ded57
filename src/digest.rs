//! Content digests
//!
//! SHA-256 over the original bytes of a picture. Two pictures with equal
//! digests are treated as identical content by the dedup engine.

use sha2::{Digest as _, Sha256};

/// Length of a content digest in bytes
pub const DIGEST_LEN: usize = 32;

/// SHA-256 digest (32 bytes)
pub type Digest = [u8; DIGEST_LEN];

/// Compute the digest of a byte buffer.
#[inline]
pub fn hash(data: &[u8]) -> Digest {
    Sha256::digest(data).into()
}

/// Byte-wise digest comparison over the full length.
#[inline]
pub fn equal(a: &Digest, b: &Digest) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Lowercase hex rendering of a digest.
pub fn to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}
