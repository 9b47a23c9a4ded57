//! Insert path

use crate::digest;
use crate::error::{PictDbError, Result};
use crate::layout::{MetadataRecord, Resolution, Validity};
use crate::resizer::Resizer;

use super::{check_duplicate_id, decide, validate_pic_id, DedupDecision, Store};

impl Store {
    /// Insert a picture under `id`, returning the slot it landed in
    ///
    /// Steps:
    /// 1. Validate the id and pick the lowest EMPTY slot
    /// 2. Reject an id already used by another valid slot
    /// 3. Hash the content and alias an identical ORIG if one exists,
    ///    otherwise decode its dimensions and append it
    /// 4. Update the in-memory record, count and version, then write the
    ///    slot record and the header
    pub fn insert(&mut self, data: &[u8], id: &str, resizer: &dyn Resizer) -> Result<usize> {
        self.ensure_writable()?;
        validate_pic_id(id)?;
        if data.is_empty() {
            return Err(PictDbError::InvalidArgument("empty image".to_string()));
        }
        let size = u32::try_from(data.len()).map_err(|_| {
            PictDbError::InvalidArgument(format!("image of {} bytes is too large", data.len()))
        })?;

        let slot = self.free_slot()?;
        check_duplicate_id(&self.metadata, slot, id)?;

        let content_hash = digest::hash(data);
        let (offset, size, orig_dims) = match decide(&self.metadata, slot, &content_hash) {
            DedupDecision::Alias {
                source,
                offset,
                size: alias_size,
                orig_dims,
            } => {
                tracing::debug!(
                    "Content of {} matches slot {}; sharing {} bytes at offset {}",
                    id,
                    source,
                    alias_size,
                    offset
                );
                (offset, alias_size, orig_dims)
            }
            DedupDecision::Append => {
                // Decode before appending so undecodable input leaves no trace
                let orig_dims = resizer.decode_dimensions(data)?;
                let offset = self.file.append(data)?;
                tracing::debug!("Appended {} bytes for {} at offset {}", size, id, offset);
                (offset, size, orig_dims)
            }
        };

        let mut record = MetadataRecord {
            picture_id: id.to_string(),
            content_hash,
            orig_dims,
            valid: Validity::NonEmpty,
            ..MetadataRecord::default()
        };
        record.set_location(Resolution::Orig, offset, size);

        // Mirror first, whole; a failed write below leaves it ahead of disk
        self.metadata[slot] = record;
        self.header.count += 1;
        self.header.version += 1;

        self.persist_slot(slot)?;
        self.persist_header()?;

        tracing::debug!(
            "Inserted {} into slot {} (count {}, version {})",
            id,
            slot,
            self.header.count,
            self.header.version
        );
        Ok(slot)
    }
}
