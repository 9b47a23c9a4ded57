//! Lazily materialized resolutions and reads

use crate::error::{PictDbError, Result};
use crate::layout::Resolution;
use crate::resizer::Resizer;

use super::Store;

impl Store {
    /// Make sure `res` of the picture in `slot` exists in the file
    ///
    /// ORIG and already-cached variants are a no-op. On a miss the ORIG
    /// bytes are resized to the header's bounding box for `res`, appended,
    /// and then the slot record and the header are rewritten, in that order.
    pub fn ensure_resolution(
        &mut self,
        slot: usize,
        res: Resolution,
        resizer: &dyn Resizer,
    ) -> Result<()> {
        let record = self.slot(slot)?;
        if !record.is_valid() {
            return Err(PictDbError::InvalidArgument(format!("slot {} is empty", slot)));
        }
        if !res.is_derived() || record.location(res).is_some() {
            return Ok(());
        }
        let (orig_offset, orig_size) = record.location(Resolution::Orig).ok_or_else(|| {
            PictDbError::InvalidArgument(format!("slot {} has no original", slot))
        })?;
        let (max_width, max_height) = self.header.target_dims(res).ok_or_else(|| {
            PictDbError::InvalidResolution(res.to_string())
        })?;
        self.ensure_writable()?;

        let original = self.read_content(orig_offset, orig_size)?;
        let resized = resizer.resize(&original, max_width, max_height)?;
        if resized.is_empty() {
            return Err(PictDbError::Resize("resizer produced no bytes".to_string()));
        }
        let size = u32::try_from(resized.len()).map_err(|_| {
            PictDbError::Resize(format!("resized image of {} bytes is too large", resized.len()))
        })?;

        let offset = self.file.append(&resized)?;

        self.metadata[slot].set_location(res, offset, size);
        self.header.version += 1;

        self.persist_slot(slot)?;
        self.persist_header()?;

        tracing::debug!(
            "Cached {} of slot {} ({} bytes at offset {}, version {})",
            res,
            slot,
            size,
            offset,
            self.header.version
        );
        Ok(())
    }

    /// Bytes of picture `id` at resolution `res`, resizing on first access
    pub fn read(&mut self, id: &str, res: Resolution, resizer: &dyn Resizer) -> Result<Vec<u8>> {
        let slot = self.find_by_id(id)?;
        self.ensure_resolution(slot, res, resizer)?;

        let (offset, size) = self.metadata[slot]
            .location(res)
            .ok_or(PictDbError::NotFound)?;
        self.read_content(offset, size)
    }
}
