//! PictDB Server Binary
//!
//! Serves one store over TCP.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pictdb::network::Server;
use pictdb::{Config, JpegResizer, OpenMode, Store, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// PictDB Server
#[derive(Parser, Debug)]
#[command(name = "pictdb-server")]
#[command(about = "Serve a PictDB store over TCP")]
#[command(version)]
struct Args {
    /// Store file
    db: PathBuf,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Connections served at once; extra clients are refused
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Leave flushing to the OS instead of syncing every write step
    #[arg(long)]
    os_buffered: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pictdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("PictDB Server v{}", pictdb::VERSION);
    tracing::info!("Store: {}", args.db.display());

    let sync_strategy = if args.os_buffered {
        SyncStrategy::OsBuffered
    } else {
        SyncStrategy::EveryWrite
    };

    let config = Config::builder()
        .db_path(&args.db)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .sync_strategy(sync_strategy)
        .build();

    let store = match Store::open(&config.db_path, OpenMode::ReadWrite, config.sync_strategy) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let summary = store.header_summary();
    tracing::info!(
        "Store {} v{}: {} of {} slots used",
        summary.name,
        summary.version,
        summary.count,
        summary.capacity
    );

    let server = Server::new(config, store, Arc::new(JpegResizer::new()));

    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Ctrl+C received; closing sessions and stopping");
        shutdown.shutdown();
    }) {
        tracing::warn!("Cannot install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Serving failed: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Store closed, exiting");
    ExitCode::SUCCESS
}
