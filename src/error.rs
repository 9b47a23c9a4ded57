//! Error types for PictDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PictDbError
pub type Result<T> = std::result::Result<T, PictDbError>;

/// Unified error type for PictDB operations
#[derive(Debug, Error)]
pub enum PictDbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid picture id: {0}")]
    InvalidPicId(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    // -------------------------------------------------------------------------
    // Directory Errors
    // -------------------------------------------------------------------------
    #[error("Picture id already in use: {0}")]
    DuplicateId(String),

    #[error("Picture not found")]
    NotFound,

    #[error("Capacity {requested} exceeds the maximum of {max}")]
    CapacityExceeded { requested: u32, max: u32 },

    #[error("Store is full")]
    Full,

    // -------------------------------------------------------------------------
    // Image Errors
    // -------------------------------------------------------------------------
    #[error("Resize error: {0}")]
    Resize(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Remote error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PictDbError {
    /// Stable short name of the error kind, used by the front ends
    pub fn kind_name(&self) -> &'static str {
        match self {
            PictDbError::Io(_) => "IO",
            PictDbError::OutOfMemory(_) => "OUT_OF_MEMORY",
            PictDbError::InvalidArgument(_) => "INVALID_ARGUMENT",
            PictDbError::InvalidFilename(_) => "INVALID_FILENAME",
            PictDbError::InvalidPicId(_) => "INVALID_PICID",
            PictDbError::InvalidResolution(_) => "INVALID_RESOLUTION",
            PictDbError::DuplicateId(_) => "DUPLICATE_ID",
            PictDbError::NotFound => "NOT_FOUND",
            PictDbError::CapacityExceeded { .. } => "MAX_FILES",
            PictDbError::Full => "FULL",
            PictDbError::Resize(_) => "RESIZE",
            PictDbError::Serialization(_) => "SERIALIZATION",
            PictDbError::Protocol(_) => "PROTOCOL",
            PictDbError::Remote(_) => "REMOTE",
            PictDbError::Config(_) => "CONFIG",
        }
    }
}

impl From<serde_json::Error> for PictDbError {
    fn from(e: serde_json::Error) -> Self {
        PictDbError::Serialization(e.to_string())
    }
}

impl From<std::collections::TryReserveError> for PictDbError {
    fn from(e: std::collections::TryReserveError) -> Self {
        PictDbError::OutOfMemory(e.to_string())
    }
}
