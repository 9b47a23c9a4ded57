//! Store header

use crate::error::{PictDbError, Result};

use super::{read_str, read_u16, read_u32, write_str, Resolution, HEADER_SIZE, MAX_DB_NAME};

// Field offsets within the header
const NAME: usize = 0;
const VERSION: usize = 32;
const COUNT: usize = 36;
const CAPACITY: usize = 40;
const RESIZED: usize = 44;

/// Header stored at offset 0 of every store file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHeader {
    /// Store name, at most `MAX_DB_NAME` bytes
    pub name: String,

    /// Bumped on every structural mutation
    pub version: u32,

    /// Number of NON_EMPTY slots
    pub count: u32,

    /// Number of slots; fixed at creation
    pub capacity: u32,

    /// Target (width, height) for THUMB and SMALL, in that order
    pub resized_dims: [(u16, u16); 2],
}

impl StoreHeader {
    pub fn new(name: &str, capacity: u32, thumb: (u16, u16), small: (u16, u16)) -> Self {
        Self {
            name: name.to_string(),
            version: 0,
            count: 0,
            capacity,
            resized_dims: [thumb, small],
        }
    }

    /// Target bounding box for a derived resolution, `None` for ORIG
    pub fn target_dims(&self, res: Resolution) -> Option<(u16, u16)> {
        match res {
            Resolution::Thumb => Some(self.resized_dims[0]),
            Resolution::Small => Some(self.resized_dims[1]),
            Resolution::Orig => None,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        write_str(&mut buf[NAME..NAME + MAX_DB_NAME + 1], &self.name);
        buf[VERSION..VERSION + 4].copy_from_slice(&self.version.to_le_bytes());
        buf[COUNT..COUNT + 4].copy_from_slice(&self.count.to_le_bytes());
        buf[CAPACITY..CAPACITY + 4].copy_from_slice(&self.capacity.to_le_bytes());
        for (i, (w, h)) in self.resized_dims.iter().enumerate() {
            let at = RESIZED + i * 4;
            buf[at..at + 2].copy_from_slice(&w.to_le_bytes());
            buf[at + 2..at + 4].copy_from_slice(&h.to_le_bytes());
        }
        // Reserved u32 + u64 stay zero
        buf
    }

    pub fn decode(buf: &[u8; HEADER_SIZE as usize]) -> Result<Self> {
        let name = read_str(&buf[NAME..NAME + MAX_DB_NAME + 1])
            .map_err(|e| PictDbError::InvalidArgument(format!("corrupt store name: {}", e)))?;

        let mut resized_dims = [(0u16, 0u16); 2];
        for (i, dims) in resized_dims.iter_mut().enumerate() {
            let at = RESIZED + i * 4;
            *dims = (read_u16(buf, at), read_u16(buf, at + 2));
        }

        Ok(Self {
            name,
            version: read_u32(buf, VERSION),
            count: read_u32(buf, COUNT),
            capacity: read_u32(buf, CAPACITY),
            resized_dims,
        })
    }
}
