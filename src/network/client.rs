//! Client
//!
//! Blocking client for the picture server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use serde::Deserialize;

use crate::error::{PictDbError, Result};
use crate::layout::Resolution;
use crate::protocol::{read_response, write_command, Command, Response, Status};

#[derive(Deserialize)]
struct PictureList {
    #[serde(rename = "Pictures")]
    pictures: Vec<String>,
}

/// Connection to a picture server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command and wait for its response
    pub fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Ids of all stored pictures, in slot order
    pub fn list(&mut self) -> Result<Vec<String>> {
        let payload = self.expect_ok(&Command::List)?.unwrap_or_default();
        let list: PictureList = serde_json::from_slice(&payload)?;
        Ok(list.pictures)
    }

    pub fn read(&mut self, id: &str, resolution: Resolution) -> Result<Vec<u8>> {
        let command = Command::Read {
            id: id.to_string(),
            resolution,
        };
        Ok(self.expect_ok(&command)?.unwrap_or_default())
    }

    pub fn insert(&mut self, id: &str, data: &[u8]) -> Result<()> {
        let command = Command::Insert {
            id: id.to_string(),
            data: data.to_vec(),
        };
        self.expect_ok(&command).map(|_| ())
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.expect_ok(&Command::Delete { id: id.to_string() })
            .map(|_| ())
    }

    pub fn ping(&mut self) -> Result<()> {
        match self.expect_ok(&Command::Ping)? {
            Some(ref p) if p.as_slice() == b"PONG" => Ok(()),
            other => Err(PictDbError::Protocol(format!(
                "unexpected PING reply: {:?}",
                other
            ))),
        }
    }

    fn expect_ok(&mut self, command: &Command) -> Result<Option<Vec<u8>>> {
        let response = self.call(command)?;
        match response.status {
            Status::Ok => Ok(response.payload),
            Status::NotFound => Err(PictDbError::NotFound),
            Status::Error => Err(PictDbError::Remote(
                response.message().unwrap_or_default(),
            )),
        }
    }
}
