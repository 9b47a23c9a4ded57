//! Command definitions
//!
//! Represents commands from clients.

use crate::layout::Resolution;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    List = 0x01,
    Read = 0x02,
    Insert = 0x03,
    Delete = 0x04,
    Ping = 0x05,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the ids of all stored pictures
    List,

    /// Read a picture at a resolution
    Read { id: String, resolution: Resolution },

    /// Insert a picture
    Insert { id: String, data: Vec<u8> },

    /// Delete a picture
    Delete { id: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::Read { .. } => CommandType::Read,
            Command::Insert { .. } => CommandType::Insert,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }
}
