//! Configuration for PictDB
//!
//! Runtime settings (`Config`) for front ends that keep a store open, and
//! creation-time parameters (`CreateOptions`) that end up in the header.

use std::path::PathBuf;

use crate::error::{PictDbError, Result};
use crate::layout::MAX_MAX_FILES;

/// Largest accepted thumbnail edge, in pixels
pub const MAX_THUMB_RES: u16 = 128;

/// Largest accepted small-image edge, in pixels
pub const MAX_SMALL_RES: u16 = 512;

/// Main configuration for a PictDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the store file (header, directory and content in one file)
    pub db_path: PathBuf,

    /// How each step of a mutation is made durable
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// host:port the server binds; port 0 picks a free one
    pub listen_addr: String,

    /// Connections beyond this are answered `server busy` and closed
    pub max_connections: usize,

    /// Idle time after which a connection is dropped (ms, 0 = never)
    pub read_timeout_ms: u64,

    /// Per-response write timeout (ms, 0 = never)
    pub write_timeout_ms: u64,

    /// How long the accept loop waits for a shutdown signal between polls
    pub poll_interval_ms: u64,
}

/// Sync strategy for store mutations
///
/// Writes always happen in commit order (content, then metadata record,
/// then header). The strategy only decides whether each step is forced to
/// stable storage before the next one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fdatasync after every write step (safest, slowest)
    EveryWrite,

    /// Leave flushing to the OS page cache
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./pictdb.db"),
            sync_strategy: SyncStrategy::EveryWrite,
            listen_addr: "127.0.0.1:8000".to_string(),
            max_connections: 64,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Fluent setters over `Config::default()`
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store file path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the accept loop poll interval (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Store Creation Options
// =============================================================================

/// Parameters fixed at store creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOptions {
    /// Number of directory slots (immutable after creation)
    pub capacity: u32,

    /// Bounding box (width, height) for thumbnails
    pub thumb: (u16, u16),

    /// Bounding box (width, height) for small images
    pub small: (u16, u16),
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            capacity: 10,
            thumb: (64, 64),
            small: (256, 256),
        }
    }
}

impl CreateOptions {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn thumb(mut self, width: u16, height: u16) -> Self {
        self.thumb = (width, height);
        self
    }

    pub fn small(mut self, width: u16, height: u16) -> Self {
        self.small = (width, height);
        self
    }

    /// Check capacity and resized dimensions against their bounds
    pub fn validate(&self) -> Result<()> {
        if self.capacity > MAX_MAX_FILES {
            return Err(PictDbError::CapacityExceeded {
                requested: self.capacity,
                max: MAX_MAX_FILES,
            });
        }
        if self.capacity == 0 {
            return Err(PictDbError::InvalidArgument(
                "capacity must be at least 1".to_string(),
            ));
        }
        check_dims("thumbnail", self.thumb, MAX_THUMB_RES)?;
        check_dims("small", self.small, MAX_SMALL_RES)?;
        Ok(())
    }
}

fn check_dims(label: &str, (width, height): (u16, u16), max: u16) -> Result<()> {
    if width == 0 || height == 0 || width > max || height > max {
        return Err(PictDbError::InvalidArgument(format!(
            "{} resolution {}x{} outside 1..={} per axis",
            label, width, height, max
        )));
    }
    Ok(())
}
