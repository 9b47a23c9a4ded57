//! Per-connection request loop
//!
//! One `Connection` serves one client: read a framed command, run it
//! against the shared store under the lock, write the framed response,
//! repeat until the peer hangs up, goes idle past the read timeout, or the
//! server starts shutting down.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{PictDbError, Result};
use crate::listing;
use crate::protocol::{read_command, write_response, Command, Response};
use crate::resizer::Resizer;
use crate::store::Store;

/// Run one command against a store
///
/// Returns the OK payload, if any. Shared by the server and by callers
/// that hold a `Store` directly.
pub fn execute(store: &mut Store, resizer: &dyn Resizer, command: Command) -> Result<Option<Vec<u8>>> {
    match command {
        Command::List => {
            let json = listing::to_json(&store.list_entries())?;
            Ok(Some(json.into_bytes()))
        }
        Command::Read { id, resolution } => store.read(&id, resolution, resizer).map(Some),
        Command::Insert { id, data } => {
            store.insert(&data, &id, resizer)?;
            Ok(None)
        }
        Command::Delete { id } => {
            store.delete(&id)?;
            Ok(None)
        }
        Command::Ping => Ok(Some(b"PONG".to_vec())),
    }
}

/// Map a command outcome onto the wire status
fn to_response(outcome: Result<Option<Vec<u8>>>) -> Response {
    match outcome {
        Ok(payload) => Response::ok(payload),
        Err(PictDbError::NotFound) => Response::not_found(),
        Err(e) => Response::error(&format!("{}: {}", e.kind_name(), e)),
    }
}

/// A client session bound to the shared store
pub struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    store: Arc<Mutex<Store>>,
    resizer: Arc<dyn Resizer>,
    stopping: Arc<AtomicBool>,
    peer: String,
    served: u64,
}

impl Connection {
    /// Wrap `stream`; the session ends at the next command boundary once
    /// `stopping` is set
    pub fn new(
        stream: TcpStream,
        store: Arc<Mutex<Store>>,
        resizer: Arc<dyn Resizer>,
        stopping: Arc<AtomicBool>,
    ) -> Result<Self> {
        let peer = match stream.peer_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => "unknown".to_string(),
        };
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            store,
            resizer,
            stopping,
            peer,
            served: 0,
        })
    }

    /// Apply read/write timeouts; 0 leaves the corresponding side blocking
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let as_timeout = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        self.reader.get_ref().set_read_timeout(as_timeout(read_ms))?;
        self.writer.get_ref().set_write_timeout(as_timeout(write_ms))?;
        Ok(())
    }

    /// Serve commands until the client leaves
    ///
    /// A clean hang-up, an idle timeout or a server shutdown ends the
    /// session with `Ok`. A
    /// malformed frame is answered with an ERROR response and ends it with
    /// the decode error.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Session opened for {}", self.peer);

        while let Some(command) = self.next_command()? {
            if self.stopping.load(Ordering::SeqCst) {
                tracing::debug!("Server stopping; ending session for {}", self.peer);
                let _ = write_response(&mut self.writer, &Response::error("server shutting down"));
                break;
            }
            tracing::trace!("{:?} from {}", command.command_type(), self.peer);

            let response = {
                let mut store = self.store.lock();
                to_response(execute(&mut store, self.resizer.as_ref(), command))
            };
            if let Some(message) = response.message() {
                tracing::debug!("Command from {} failed: {}", self.peer, message);
            }

            match write_response(&mut self.writer, &response) {
                Ok(()) => self.served += 1,
                Err(PictDbError::Io(ref e)) if is_hangup(e.kind()) => {
                    tracing::debug!("{} left before its response was sent", self.peer);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Cannot answer {}: {}", self.peer, e);
                    return Err(e);
                }
            }
        }

        tracing::debug!("Session closed for {} after {} command(s)", self.peer, self.served);
        Ok(())
    }

    /// Next command, or `None` once the peer hung up or idled out
    fn next_command(&mut self) -> Result<Option<Command>> {
        match read_command(&mut self.reader) {
            Ok(command) => Ok(Some(command)),
            Err(PictDbError::Io(ref e)) if is_hangup(e.kind()) => Ok(None),
            Err(PictDbError::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                tracing::debug!("{} idle past the read timeout", self.peer);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Bad frame from {}: {}", self.peer, e);
                let reply = Response::error(&format!("{}: {}", e.kind_name(), e));
                let _ = write_response(&mut self.writer, &reply);
                Err(e)
            }
        }
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer
    }
}

fn is_hangup(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
