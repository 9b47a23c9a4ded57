//! Server Tests
//!
//! These tests verify:
//! - Every command over a live TCP connection
//! - Error and NOT_FOUND mapping on the wire
//! - The connection limit
//! - Graceful shutdown closing the store

use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use pictdb::network::{execute, Client, Server, ShutdownHandle};
use pictdb::protocol::{read_response, Command, Status};
use pictdb::{
    Config, JpegResizer, OpenMode, PictDbError, Resizer, Resolution, Store, SyncStrategy,
};
use tempfile::TempDir;

#[path = "../common/mod.rs"]
mod common;

use common::{make_jpeg, setup_temp_store, temp_store_path, FakeResizer};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    temp: TempDir,
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    handle: JoinHandle<pictdb::Result<()>>,
}

impl TestServer {
    fn stop(self) -> TempDir {
        self.shutdown.shutdown();
        self.handle.join().unwrap().unwrap();
        self.temp
    }
}

fn start_server(capacity: u32, max_connections: usize) -> TestServer {
    start_server_with_read_timeout(capacity, max_connections, 500)
}

fn start_server_with_read_timeout(
    capacity: u32,
    max_connections: usize,
    read_timeout_ms: u64,
) -> TestServer {
    let (temp, store) = setup_temp_store(capacity);
    let config = Config::builder()
        .db_path(temp_store_path(&temp))
        .listen_addr("127.0.0.1:0")
        .max_connections(max_connections)
        .read_timeout_ms(read_timeout_ms)
        .poll_interval_ms(10)
        .build();

    let mut server = Server::new(config, store, Arc::new(JpegResizer::new()));
    let addr = server.bind().unwrap();
    let shutdown = server.shutdown_handle();
    let handle = thread::spawn(move || server.run());

    TestServer {
        temp,
        addr,
        shutdown,
        handle,
    }
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_ping() {
    let server = start_server(4, 8);
    let mut client = Client::connect(server.addr).unwrap();

    client.ping().unwrap();

    drop(client);
    server.stop();
}

#[test]
fn test_insert_list_read_delete() {
    let server = start_server(4, 8);
    let mut client = Client::connect(server.addr).unwrap();
    let image = make_jpeg(200, 100);

    assert!(client.list().unwrap().is_empty());

    client.insert("one", &image).unwrap();
    client.insert("two", &make_jpeg(50, 50)).unwrap();
    assert_eq!(client.list().unwrap(), vec!["one", "two"]);

    assert_eq!(client.read("one", Resolution::Orig).unwrap(), image);
    let thumb = client.read("one", Resolution::Thumb).unwrap();
    assert_eq!(
        JpegResizer::new().decode_dimensions(&thumb).unwrap(),
        (64, 32)
    );

    client.delete("one").unwrap();
    assert_eq!(client.list().unwrap(), vec!["two"]);

    drop(client);
    server.stop();
}

#[test]
fn test_not_found_maps_to_error_kind() {
    let server = start_server(4, 8);
    let mut client = Client::connect(server.addr).unwrap();

    assert!(matches!(
        client.read("ghost", Resolution::Orig),
        Err(PictDbError::NotFound)
    ));
    assert!(matches!(client.delete("ghost"), Err(PictDbError::NotFound)));

    drop(client);
    server.stop();
}

#[test]
fn test_store_errors_are_reported_remotely() {
    let server = start_server(1, 8);
    let mut client = Client::connect(server.addr).unwrap();
    let image = make_jpeg(20, 20);

    client.insert("only", &image).unwrap();

    match client.insert("only", &image) {
        Err(PictDbError::Remote(msg)) => assert!(msg.starts_with("FULL"), "{}", msg),
        other => panic!("Expected remote FULL error, got {:?}", other),
    }
    match client.insert("", &image) {
        Err(PictDbError::Remote(msg)) => assert!(msg.starts_with("INVALID_PICID"), "{}", msg),
        other => panic!("Expected remote INVALID_PICID error, got {:?}", other),
    }

    // The connection stays usable after errors
    client.ping().unwrap();

    drop(client);
    server.stop();
}

#[test]
fn test_duplicate_id_over_the_wire() {
    let server = start_server(4, 8);
    let mut client = Client::connect(server.addr).unwrap();

    client.insert("dup", &make_jpeg(20, 20)).unwrap();
    match client.insert("dup", &make_jpeg(30, 30)) {
        Err(PictDbError::Remote(msg)) => assert!(msg.starts_with("DUPLICATE_ID"), "{}", msg),
        other => panic!("Expected remote DUPLICATE_ID error, got {:?}", other),
    }

    drop(client);
    server.stop();
}

#[test]
fn test_clients_share_one_store() {
    let server = start_server(8, 8);
    let addr = server.addr;

    let writers: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                client
                    .insert(&format!("pic-{}", i), &make_jpeg(10 + i, 10))
                    .unwrap();
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }

    let mut client = Client::connect(addr).unwrap();
    let mut ids = client.list().unwrap();
    ids.sort();
    assert_eq!(ids, vec!["pic-0", "pic-1", "pic-2", "pic-3"]);

    drop(client);
    server.stop();
}

// =============================================================================
// Connection Limit
// =============================================================================

#[test]
fn test_connection_limit_refuses_extra_clients() {
    let server = start_server(4, 1);
    let mut first = Client::connect(server.addr).unwrap();
    first.ping().unwrap();

    let mut second = TcpStream::connect(server.addr).unwrap();
    let response = read_response(&mut second).unwrap();
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.message().as_deref(), Some("server busy"));

    first.ping().unwrap();

    drop(first);
    drop(second);
    server.stop();
}

// =============================================================================
// Shutdown
// =============================================================================

#[test]
fn test_shutdown_persists_store() {
    let server = start_server(4, 8);
    let mut client = Client::connect(server.addr).unwrap();
    client.insert("kept", &make_jpeg(40, 40)).unwrap();
    drop(client);

    let temp = server.stop();

    let store = Store::open(
        &temp_store_path(&temp),
        OpenMode::ReadOnly,
        SyncStrategy::EveryWrite,
    )
    .unwrap();
    assert_eq!(store.count(), 1);
    assert_eq!(store.find_by_id("kept").unwrap(), 0);
}

/// Poll until the server thread exits or `limit` passes
fn wait_finished(handle: &JoinHandle<pictdb::Result<()>>, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    true
}

#[test]
fn test_shutdown_with_active_client() {
    let server = start_server(4, 8);
    let mut client = Client::connect(server.addr).unwrap();
    client.ping().unwrap();

    let pinger = thread::spawn(move || {
        let mut pings = 0u32;
        while client.ping().is_ok() {
            pings += 1;
            thread::sleep(Duration::from_millis(50));
        }
        pings
    });
    thread::sleep(Duration::from_millis(200));

    server.shutdown.shutdown();

    assert!(
        wait_finished(&server.handle, Duration::from_secs(3)),
        "server kept running while a client was active"
    );
    server.handle.join().unwrap().unwrap();
    assert!(pinger.join().unwrap() > 0);
}

#[test]
fn test_shutdown_with_idle_client_and_no_read_timeout() {
    let server = start_server_with_read_timeout(4, 8, 0);
    let mut client = Client::connect(server.addr).unwrap();
    client.ping().unwrap();

    server.shutdown.shutdown();

    assert!(
        wait_finished(&server.handle, Duration::from_secs(3)),
        "server waited on an idle session"
    );
    server.handle.join().unwrap().unwrap();
    assert!(client.ping().is_err());
}

#[test]
fn test_shutdown_handle_is_idempotent() {
    let server = start_server(4, 8);
    server.shutdown.shutdown();
    server.shutdown.shutdown();
    server.handle.join().unwrap().unwrap();
}

// =============================================================================
// Direct Execution
// =============================================================================

#[test]
fn test_execute_without_network() {
    let (_temp, mut store) = setup_temp_store(4);
    let resizer = FakeResizer::new();
    let resizer: &dyn Resizer = &resizer;

    let insert = Command::Insert {
        id: "a".to_string(),
        data: b"bytes".to_vec(),
    };
    assert_eq!(execute(&mut store, resizer, insert).unwrap(), None);

    let listing = execute(&mut store, resizer, Command::List).unwrap().unwrap();
    assert_eq!(listing, br#"{"Pictures":["a"]}"#.to_vec());

    let read = Command::Read {
        id: "a".to_string(),
        resolution: Resolution::Small,
    };
    assert_eq!(
        execute(&mut store, resizer, read).unwrap(),
        Some(b"resized".to_vec())
    );

    let pong = execute(&mut store, resizer, Command::Ping).unwrap();
    assert_eq!(pong, Some(b"PONG".to_vec()));

    let missing = Command::Delete {
        id: "zzz".to_string(),
    };
    assert!(matches!(
        execute(&mut store, resizer, missing),
        Err(PictDbError::NotFound)
    ));
}
