//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{PictDbError, Result};
use crate::protocol::{write_response, Response};
use crate::resizer::Resizer;
use crate::store::Store;

use super::Connection;

/// Asks a running server to stop accepting and return
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        // Full means a signal is already pending; disconnected means the server is gone
        let _ = self.tx.try_send(());
    }
}

/// A spawned session plus a handle on its socket for waking blocked reads
struct Worker {
    stream: TcpStream,
    handle: JoinHandle<()>,
}

/// TCP server for one store
pub struct Server {
    config: Config,
    store: Arc<Mutex<Store>>,
    resizer: Arc<dyn Resizer>,
    listener: Option<TcpListener>,
    shutdown_tx: Sender<()>,
    shutdown_rx: Receiver<()>,
    active: Arc<AtomicUsize>,
    stopping: Arc<AtomicBool>,
}

impl Server {
    /// Create a new server owning `store`
    pub fn new(config: Config, store: Store, resizer: Arc<dyn Resizer>) -> Self {
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);
        Self {
            config,
            store: Arc::new(Mutex::new(store)),
            resizer,
            listener: None,
            shutdown_tx,
            shutdown_rx,
            active: Arc::new(AtomicUsize::new(0)),
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listen address without serving yet
    ///
    /// Returns the bound address (useful with port 0).
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Serve until a shutdown signal arrives, then close the store
    ///
    /// Open sessions are closed too: the stop flag ends them at the next
    /// command, and shutting down their sockets wakes any blocked read.
    pub fn run(mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = self
            .listener
            .take()
            .ok_or_else(|| PictDbError::Config("listener not bound".to_string()))?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        let poll = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let mut workers: Vec<Worker> = Vec::new();

        loop {
            match self.shutdown_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            match listener.accept() {
                Ok((stream, peer)) => {
                    workers.retain(|w| !w.handle.is_finished());
                    if let Some(worker) = self.dispatch(stream, peer) {
                        workers.push(worker);
                    }
                }
                Err(e) => {
                    if e.kind() != ErrorKind::WouldBlock {
                        // EMFILE and friends persist; wait a poll interval before retrying
                        tracing::warn!("Accept failed: {}", e);
                    }
                    match self.shutdown_rx.recv_timeout(poll) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }
            }
        }

        self.stopping.store(true, Ordering::SeqCst);
        tracing::info!("Shutdown requested; closing {} connection(s)", workers.len());
        for worker in workers {
            let _ = worker.stream.shutdown(Shutdown::Both);
            let _ = worker.handle.join();
        }

        match Arc::try_unwrap(self.store) {
            Ok(store) => store.into_inner().close(),
            Err(_) => {
                tracing::warn!("Store still referenced at shutdown; skipping close");
                Ok(())
            }
        }
    }

    /// Spawn a handler thread for `stream`, or refuse it when at capacity
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) -> Option<Worker> {
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Cannot configure stream from {}: {}", peer, e);
            return None;
        }

        if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!("Refusing {}: {} connections open", peer, self.config.max_connections);
            let mut stream = stream;
            let _ = write_response(&mut stream, &Response::error("server busy"));
            return None;
        }

        let wake = match stream.try_clone() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Cannot set up connection from {}: {}", peer, e);
                return None;
            }
        };
        let mut connection = match Connection::new(
            stream,
            Arc::clone(&self.store),
            Arc::clone(&self.resizer),
            Arc::clone(&self.stopping),
        ) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Cannot set up connection from {}: {}", peer, e);
                return None;
            }
        };
        if let Err(e) =
            connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)
        {
            tracing::warn!("Cannot set timeouts for {}: {}", peer, e);
        }

        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                }
                active.fetch_sub(1, Ordering::SeqCst);
            });

        match spawned {
            Ok(handle) => Some(Worker { stream: wake, handle }),
            Err(e) => {
                tracing::error!("Cannot spawn handler for {}: {}", peer, e);
                self.active.fetch_sub(1, Ordering::SeqCst);
                None
            }
        }
    }
}
