//! Metadata record (one directory slot)

use crate::digest::{Digest, DIGEST_LEN};
use crate::error::{PictDbError, Result};

use super::{
    read_str, read_u16, read_u32, read_u64, write_str, Resolution, MAX_PIC_ID, METADATA_SIZE,
    NB_RES,
};

// Field offsets within a record
const PICTURE_ID: usize = 0;
const CONTENT_HASH: usize = 128;
const ORIG_DIMS: usize = 160;
const SIZE: usize = 168;
const OFFSET: usize = 180;
const VALID: usize = 204;

/// Tombstone flag of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Validity {
    #[default]
    Empty = 0,
    NonEmpty = 1,
}

/// A single directory slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataRecord {
    /// Picture identifier, at most `MAX_PIC_ID` bytes
    pub picture_id: String,

    /// Digest of the ORIG bytes
    pub content_hash: Digest,

    /// (width, height) of the original image
    pub orig_dims: (u32, u32),

    /// Byte length per resolution; 0 means not materialized
    pub size: [u32; NB_RES],

    /// File offset per resolution; 0 means not materialized
    pub offset: [u64; NB_RES],

    pub valid: Validity,
}

impl MetadataRecord {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid == Validity::NonEmpty
    }

    /// (offset, size) of a resolution, `None` when not materialized
    pub fn location(&self, res: Resolution) -> Option<(u64, u32)> {
        let i = res.index();
        if self.size[i] == 0 {
            None
        } else {
            Some((self.offset[i], self.size[i]))
        }
    }

    pub fn set_location(&mut self, res: Resolution, offset: u64, size: u32) {
        self.offset[res.index()] = offset;
        self.size[res.index()] = size;
    }

    pub fn encode(&self) -> [u8; METADATA_SIZE as usize] {
        let mut buf = [0u8; METADATA_SIZE as usize];
        write_str(&mut buf[PICTURE_ID..PICTURE_ID + MAX_PIC_ID + 1], &self.picture_id);
        buf[CONTENT_HASH..CONTENT_HASH + DIGEST_LEN].copy_from_slice(&self.content_hash);
        buf[ORIG_DIMS..ORIG_DIMS + 4].copy_from_slice(&self.orig_dims.0.to_le_bytes());
        buf[ORIG_DIMS + 4..ORIG_DIMS + 8].copy_from_slice(&self.orig_dims.1.to_le_bytes());
        for i in 0..NB_RES {
            let at = SIZE + i * 4;
            buf[at..at + 4].copy_from_slice(&self.size[i].to_le_bytes());
            let at = OFFSET + i * 8;
            buf[at..at + 8].copy_from_slice(&self.offset[i].to_le_bytes());
        }
        buf[VALID..VALID + 2].copy_from_slice(&(self.valid as u16).to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; METADATA_SIZE as usize]) -> Result<Self> {
        let picture_id = read_str(&buf[PICTURE_ID..PICTURE_ID + MAX_PIC_ID + 1])
            .map_err(|e| PictDbError::InvalidArgument(format!("corrupt picture id: {}", e)))?;

        let mut content_hash = [0u8; DIGEST_LEN];
        content_hash.copy_from_slice(&buf[CONTENT_HASH..CONTENT_HASH + DIGEST_LEN]);

        let mut size = [0u32; NB_RES];
        let mut offset = [0u64; NB_RES];
        for i in 0..NB_RES {
            size[i] = read_u32(buf, SIZE + i * 4);
            offset[i] = read_u64(buf, OFFSET + i * 8);
        }

        let valid = match read_u16(buf, VALID) {
            0 => Validity::Empty,
            1 => Validity::NonEmpty,
            other => {
                return Err(PictDbError::InvalidArgument(format!(
                    "corrupt validity flag: {}",
                    other
                )))
            }
        };

        Ok(Self {
            picture_id,
            content_hash,
            orig_dims: (read_u32(buf, ORIG_DIMS), read_u32(buf, ORIG_DIMS + 4)),
            size,
            offset,
            valid,
        })
    }
}
