//! Wire Protocol
//!
//! Length-prefixed binary frames exchanged between `pictdb-server` and its
//! clients. Requests and responses share one frame shape; only the meaning
//! of the leading byte differs.
//!
//! ```text
//!   0        1                 5
//!   ┌────────┬─────────────────┬──────────────────────────────┐
//!   │ kind   │ payload len     │ payload (len bytes)          │
//!   │ (u8)   │ (u32, big-end.) │                              │
//!   └────────┴─────────────────┴──────────────────────────────┘
//! ```
//!
//! | kind | request | payload                              |
//! |------|---------|--------------------------------------|
//! | 0x01 | LIST    | empty                                |
//! | 0x02 | READ    | id_len (4) + id + resolution (1)     |
//! | 0x03 | INSERT  | id_len (4) + id + image bytes        |
//! | 0x04 | DELETE  | id_len (4) + id                      |
//! | 0x05 | PING    | empty                                |
//!
//! | kind | response  | payload                            |
//! |------|-----------|------------------------------------|
//! | 0x00 | OK        | JSON listing, picture bytes, PONG  |
//! | 0x01 | NOT_FOUND | empty                              |
//! | 0x02 | ERROR     | `KIND: detail` message             |

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
