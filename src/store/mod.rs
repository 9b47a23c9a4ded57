//! Store Module
//!
//! The open store file plus an in-memory mirror of its header and
//! metadata directory.
//!
//! ## Responsibilities
//! - Create and open store files (header + fixed directory)
//! - Directory operations: lookup, insert, delete
//! - Content deduplication on insert
//! - Lazy resize-and-append of derived resolutions
//!
//! ## Commit Order
//! Every mutation writes bottom-up: content bytes first, then the one
//! metadata record that references them, then the header. A crash between
//! steps can leave unreferenced bytes at the end of the file or a stale
//! header `version`, but never a record pointing at bytes that were not
//! written. Steps are durable in order; they are not atomic as a group,
//! and a failed write is not rolled back. After such a failure the
//! in-memory mirror may be ahead of the file.

mod dedup;
mod directory;
mod file;
mod insert;
mod resize_cache;

pub use dedup::{check_duplicate_id, decide, DedupDecision};

use std::path::Path;

use crate::config::{Config, CreateOptions, SyncStrategy};
use crate::error::{PictDbError, Result};
use crate::layout::{
    content_start, slot_offset, MetadataRecord, StoreHeader, HEADER_SIZE, MAX_DB_NAME,
    MAX_MAX_FILES, MAX_PIC_ID, METADATA_SIZE,
};

use file::StoreFile;

/// How a store file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// An open picture store
///
/// Owns the file handle and the whole metadata directory. All operations
/// run to completion on the calling thread; the file must not be shared
/// with other writers while a `Store` is open.
pub struct Store {
    /// Open store file
    file: StoreFile,

    /// Mirror of the on-disk header
    header: StoreHeader,

    /// Mirror of the on-disk directory, always `header.capacity` long
    metadata: Vec<MetadataRecord>,
}

impl Store {
    /// Create a new store file with `options.capacity` empty slots
    ///
    /// The header name is the final component of `path`, at most
    /// `MAX_DB_NAME` (31) bytes; parent directories do not count toward it.
    /// Validation happens before the file is touched, so a rejected
    /// capacity or name leaves no file behind.
    pub fn create(path: &Path, options: &CreateOptions, sync_strategy: SyncStrategy) -> Result<Self> {
        let name = store_name(path)?;
        options.validate()?;

        let header = StoreHeader::new(&name, options.capacity, options.thumb, options.small);
        let metadata = empty_directory(options.capacity)?;

        // Header and empty directory go out as one contiguous write
        let dir_len = options.capacity as usize * METADATA_SIZE as usize;
        let mut image = Vec::new();
        image.try_reserve_exact(HEADER_SIZE as usize + dir_len)?;
        image.extend_from_slice(&header.encode());
        let empty_record = MetadataRecord::default().encode();
        for _ in 0..options.capacity {
            image.extend_from_slice(&empty_record);
        }

        let mut file = StoreFile::create(path, sync_strategy)?;
        file.write_at(0, &image)?;
        file.sync()?;

        tracing::info!(
            "Created store {} at {} (capacity {}, thumb {}x{}, small {}x{})",
            header.name,
            path.display(),
            options.capacity,
            options.thumb.0,
            options.thumb.1,
            options.small.0,
            options.small.1
        );

        Ok(Self {
            file,
            header,
            metadata,
        })
    }

    /// Open an existing store and load its header and directory
    pub fn open(path: &Path, mode: OpenMode, sync_strategy: SyncStrategy) -> Result<Self> {
        let mut file = StoreFile::open(path, mode, sync_strategy)?;

        let mut header_buf = [0u8; HEADER_SIZE as usize];
        file.read_exact_at(0, &mut header_buf)?;
        let mut header = StoreHeader::decode(&header_buf)?;

        if header.capacity > MAX_MAX_FILES {
            return Err(PictDbError::InvalidArgument(format!(
                "corrupt header: capacity {} exceeds {}",
                header.capacity, MAX_MAX_FILES
            )));
        }

        let dir_len = header.capacity as usize * METADATA_SIZE as usize;
        let mut dir_buf = Vec::new();
        dir_buf.try_reserve_exact(dir_len)?;
        dir_buf.resize(dir_len, 0);
        file.read_exact_at(HEADER_SIZE, &mut dir_buf)?;

        let mut metadata = Vec::new();
        metadata.try_reserve_exact(header.capacity as usize)?;
        let mut record_buf = [0u8; METADATA_SIZE as usize];
        for chunk in dir_buf.chunks_exact(METADATA_SIZE as usize) {
            record_buf.copy_from_slice(chunk);
            metadata.push(MetadataRecord::decode(&record_buf)?);
        }

        let valid = metadata.iter().filter(|m| m.is_valid()).count() as u32;
        if valid != header.count {
            tracing::warn!(
                "Header count {} disagrees with {} valid slots; using slot count",
                header.count,
                valid
            );
            header.count = valid;
        }

        tracing::info!(
            "Opened store {} at {} ({} of {} slots used, version {})",
            header.name,
            path.display(),
            header.count,
            header.capacity,
            header.version
        );

        Ok(Self {
            file,
            header,
            metadata,
        })
    }

    /// Open read-write using the path and sync strategy of `config`
    pub fn open_config(config: &Config) -> Result<Self> {
        Self::open(&config.db_path, OpenMode::ReadWrite, config.sync_strategy)
    }

    /// Close the store, syncing a writable file first
    ///
    /// Consumes the store so it cannot be used afterwards.
    pub fn close(mut self) -> Result<()> {
        if self.file.mode() == OpenMode::ReadWrite {
            self.file.sync()?;
        }
        tracing::info!("Closed store {}", self.header.name);
        Ok(())
    }

    // =========================================================================
    // Raw content access
    // =========================================================================

    /// Read `len` bytes of the content region starting at `offset`
    pub fn read_content(&mut self, offset: u64, len: u32) -> Result<Vec<u8>> {
        let start = content_start(self.header.capacity);
        if offset < start {
            return Err(PictDbError::InvalidArgument(format!(
                "offset {} lies before the content region ({})",
                offset, start
            )));
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(len as usize)?;
        buf.resize(len as usize, 0);
        self.file.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    /// The full directory, one entry per slot
    pub fn metadata(&self) -> &[MetadataRecord] {
        &self.metadata
    }

    /// Record in `slot`, bounds-checked against capacity
    pub fn slot(&self, slot: usize) -> Result<&MetadataRecord> {
        self.metadata.get(slot).ok_or_else(|| {
            PictDbError::InvalidArgument(format!(
                "slot {} out of bounds (capacity {})",
                slot, self.header.capacity
            ))
        })
    }

    pub fn count(&self) -> u32 {
        self.header.count
    }

    pub fn capacity(&self) -> u32 {
        self.header.capacity
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mode(&self) -> OpenMode {
        self.file.mode()
    }

    /// Total length of the store file
    pub fn file_len(&self) -> Result<u64> {
        self.file.len()
    }

    /// Length of the content region
    pub fn content_len(&self) -> Result<u64> {
        Ok(self
            .file
            .len()?
            .saturating_sub(content_start(self.header.capacity)))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_writable(&self) -> Result<()> {
        if self.file.mode() == OpenMode::ReadOnly {
            return Err(PictDbError::InvalidArgument(
                "store is opened read-only".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the in-memory record of `slot` to its fixed position
    fn persist_slot(&mut self, slot: usize) -> Result<()> {
        let bytes = self.slot(slot)?.encode();
        self.file.write_at(slot_offset(slot), &bytes)
    }

    /// Write the in-memory header to offset 0
    fn persist_header(&mut self) -> Result<()> {
        let bytes = self.header.encode();
        self.file.write_at(0, &bytes)
    }
}

// =============================================================================
// Free helpers
// =============================================================================

/// Reject ids that are empty or longer than `MAX_PIC_ID` bytes
pub(crate) fn validate_pic_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PictDbError::InvalidPicId("empty id".to_string()));
    }
    if id.len() > MAX_PIC_ID {
        return Err(PictDbError::InvalidPicId(format!(
            "id is {} bytes (max {})",
            id.len(),
            MAX_PIC_ID
        )));
    }
    if id.as_bytes().contains(&0) {
        return Err(PictDbError::InvalidPicId("id contains NUL".to_string()));
    }
    Ok(())
}

/// Header name for a store at `path`: its final component
fn store_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PictDbError::InvalidFilename(path.display().to_string()))?;
    if name.len() > MAX_DB_NAME || name.as_bytes().contains(&0) {
        return Err(PictDbError::InvalidFilename(format!(
            "{} ({} bytes, max {})",
            name,
            name.len(),
            MAX_DB_NAME
        )));
    }
    Ok(name.to_string())
}

fn empty_directory(capacity: u32) -> Result<Vec<MetadataRecord>> {
    let mut metadata = Vec::new();
    metadata.try_reserve_exact(capacity as usize)?;
    metadata.resize(capacity as usize, MetadataRecord::default());
    Ok(metadata)
}
