//! # PictDB
//!
//! A single-file picture store with:
//! - A fixed-size metadata directory and an append-only content region
//! - Content deduplication keyed by SHA-256
//! - Thumbnail and small variants resized on first access and cached in the file
//! - Ordered, per-step durable writes (content, then record, then header)
//! - A TCP front end for remote listing, reads, inserts and deletes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          pictdbm CLI            │        TCP Server          │
//! │        (direct file access)     │   (Arc<Mutex<Store>>)      │
//! └─────────────────────┬───────────┴───────────┬───────────────┘
//!                       │                       │
//! ┌─────────────────────▼───────────────────────▼───────────────┐
//! │                          Store                              │
//! │   directory ops · dedup engine · lazy resize cache          │
//! └──────────┬──────────────────────┬───────────────────┬───────┘
//!            │                      │                   │
//!            ▼                      ▼                   ▼
//!     ┌─────────────┐        ┌─────────────┐     ┌─────────────┐
//!     │   Layout    │        │   Digest    │     │   Resizer   │
//!     │ (header +   │        │  (SHA-256)  │     │   (image)   │
//!     │  records)   │        └─────────────┘     └─────────────┘
//!     └──────┬──────┘
//!            ▼
//!     ┌─────────────────────────────────────────┐
//!     │ store file: header | directory | content │
//!     └─────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod digest;
pub mod layout;
pub mod listing;
pub mod network;
pub mod protocol;
pub mod resizer;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, CreateOptions, SyncStrategy};
pub use error::{PictDbError, Result};
pub use layout::Resolution;
pub use resizer::{JpegResizer, Resizer};
pub use store::{OpenMode, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PictDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
