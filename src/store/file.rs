//! Store file access
//!
//! Positioned reads and writes on the single store file. Every write step
//! is followed by a sync when the strategy asks for it, so callers get
//! durability in the order they issue writes.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::Result;

use super::OpenMode;

/// Handle on the open store file
#[derive(Debug)]
pub(crate) struct StoreFile {
    file: File,
    path: PathBuf,
    mode: OpenMode,
    sync_strategy: SyncStrategy,
}

impl StoreFile {
    /// Create (or truncate) a store file for writing
    pub fn create(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode: OpenMode::ReadWrite,
            sync_strategy,
        })
    }

    /// Open an existing store file
    pub fn open(path: &Path, mode: OpenMode, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode,
            sync_strategy,
        })
    }

    /// Fill `buf` from `offset`; a short read is an `UnexpectedEof` I/O error
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Overwrite bytes in place at `offset`
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        self.finish_step()
    }

    /// Append bytes at end of file, returning the offset they landed at
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(bytes)?;
        self.finish_step()?;
        Ok(offset)
    }

    /// Force everything written so far to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Handle that claims read-write but whose every write fails
    #[cfg(test)]
    pub fn open_unwritable(path: &Path) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
            path: path.to_path_buf(),
            mode: OpenMode::ReadWrite,
            sync_strategy: SyncStrategy::EveryWrite,
        })
    }

    fn finish_step(&mut self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::EveryWrite => {
                self.file.sync_data()?;
            }
            SyncStrategy::OsBuffered => {}
        }
        Ok(())
    }
}
