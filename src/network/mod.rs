//! Network Module
//!
//! TCP server and client for remote access to one store.
//!
//! ## Architecture
//! - Single acceptor thread polling a shutdown channel between accepts
//! - One thread per connection, bounded by `max_connections`
//! - The store is shared as `Arc<Mutex<Store>>`; each command holds the
//!   lock for its whole run, so store operations never interleave

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::{execute, Connection};
pub use server::{Server, ShutdownHandle};
