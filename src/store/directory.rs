//! Directory operations: lookup, slot allocation, delete

use crate::error::{PictDbError, Result};
use crate::layout::Validity;

use super::{validate_pic_id, Store};

impl Store {
    /// Slot index of the valid entry named `id`
    ///
    /// Linear scan in ascending slot order; the first match wins.
    pub fn find_by_id(&self, id: &str) -> Result<usize> {
        validate_pic_id(id)?;
        self.metadata
            .iter()
            .position(|m| m.is_valid() && m.picture_id == id)
            .ok_or(PictDbError::NotFound)
    }

    /// Lowest-index EMPTY slot, tombstoned slots included
    pub(crate) fn free_slot(&self) -> Result<usize> {
        if self.header.count >= self.header.capacity {
            return Err(PictDbError::Full);
        }
        self.metadata
            .iter()
            .position(|m| !m.is_valid())
            .ok_or(PictDbError::Full)
    }

    /// Tombstone the entry named `id`
    ///
    /// Only the slot record and the header are rewritten; the content bytes
    /// stay where they are.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.ensure_writable()?;
        let slot = self.find_by_id(id)?;

        self.metadata[slot].valid = Validity::Empty;
        self.header.count -= 1;
        self.header.version += 1;

        self.persist_slot(slot)?;
        self.persist_header()?;

        tracing::debug!(
            "Deleted {} from slot {} (count {}, version {})",
            id,
            slot,
            self.header.count,
            self.header.version
        );
        Ok(())
    }
}
