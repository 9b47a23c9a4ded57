//! Frame codec
//!
//! Byte-level encoding of commands and responses, plus blocking stream
//! helpers on top of any `Read` / `Write`.
//!
//! ## Payload by Command Type
//! - LIST:   empty
//! - READ:   id_len (4 bytes) + id + resolution (1 byte)
//! - INSERT: id_len (4 bytes) + id + image bytes
//! - DELETE: id_len (4 bytes) + id
//! - PING:   empty
//!
//! All length fields are big-endian.

use std::io::{Read, Write};

use super::{Command, Response, Status};
use crate::error::{PictDbError, Result};
use crate::layout::Resolution;

/// Kind byte + big-endian u32 payload length
pub const HEADER_SIZE: usize = 5;

/// Largest accepted payload (16 MiB); bounds the buffer a peer can make us allocate
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Requests
// =============================================================================

/// Serialize a command into one frame
pub fn encode_command(command: &Command) -> Vec<u8> {
    let cmd_type = command.command_type() as u8;

    let payload = match command {
        Command::List | Command::Ping => Vec::new(),
        Command::Read { id, resolution } => {
            let mut payload = id_prefixed(id, 1);
            payload.push(*resolution as u8);
            payload
        }
        Command::Insert { id, data } => {
            let mut payload = id_prefixed(id, data.len());
            payload.extend_from_slice(data);
            payload
        }
        Command::Delete { id } => id_prefixed(id, 0),
    };

    frame(cmd_type, &payload)
}

/// Parse one complete request frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = unframe(bytes, "request")?;

    match cmd_type {
        0x01 => expect_empty(payload, "LIST").map(|_| Command::List),
        0x02 => decode_read_command(payload),
        0x03 => {
            let (id, rest) = split_id(payload, "INSERT")?;
            Ok(Command::Insert {
                id,
                data: rest.to_vec(),
            })
        }
        0x04 => {
            let (id, rest) = split_id(payload, "DELETE")?;
            expect_empty(rest, "DELETE")?;
            Ok(Command::Delete { id })
        }
        0x05 => expect_empty(payload, "PING").map(|_| Command::Ping),
        _ => Err(PictDbError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Decode READ command payload
fn decode_read_command(payload: &[u8]) -> Result<Command> {
    let (id, rest) = split_id(payload, "READ")?;
    if rest.len() != 1 {
        return Err(PictDbError::Protocol(format!(
            "READ command: expected 1 resolution byte, got {}",
            rest.len()
        )));
    }
    let resolution = Resolution::from_index(rest[0])?;
    Ok(Command::Read { id, resolution })
}

/// Payload starting with `id_len (4) + id`, with room for `extra` more bytes
fn id_prefixed(id: &str, extra: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + id.len() + extra);
    payload.extend_from_slice(&(id.len() as u32).to_be_bytes());
    payload.extend_from_slice(id.as_bytes());
    payload
}

/// Split `id_len (4) + id + rest` into the id and the rest
fn split_id<'a>(payload: &'a [u8], name: &str) -> Result<(String, &'a [u8])> {
    if payload.len() < 4 {
        return Err(PictDbError::Protocol(format!(
            "{} command: missing id length",
            name
        )));
    }

    let id_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if payload.len() < 4 + id_len {
        return Err(PictDbError::Protocol(format!(
            "{} command: incomplete id (expected {}, got {})",
            name,
            id_len,
            payload.len() - 4
        )));
    }

    let id = String::from_utf8(payload[4..4 + id_len].to_vec())
        .map_err(|e| PictDbError::Protocol(format!("{} command: id is not UTF-8: {}", name, e)))?;
    Ok((id, &payload[4 + id_len..]))
}

fn expect_empty(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(PictDbError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Responses
// =============================================================================

/// Serialize a response into one frame
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Parse one complete response frame; an empty payload becomes `None`
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = unframe(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(PictDbError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(kind);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Validate a frame and return (kind byte, payload)
fn unframe<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(PictDbError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = check_payload_len(&bytes[..HEADER_SIZE])?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(PictDbError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(header: &[u8]) -> Result<usize> {
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(PictDbError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(payload_len as usize)
}

// =============================================================================
// Streams
// =============================================================================

/// Read one frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = check_payload_len(&header)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Block until one command frame has arrived
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Send one command frame and flush
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Block until one response frame has arrived
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Send one response frame and flush
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
