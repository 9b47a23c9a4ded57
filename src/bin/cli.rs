//! pictdbm
//!
//! Command-line manager for a PictDB store file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use pictdb::listing;
use pictdb::{CreateOptions, JpegResizer, OpenMode, PictDbError, Resolution, Store, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// PictDB manager
#[derive(Parser, Debug)]
#[command(name = "pictdbm")]
#[command(about = "Manage a single-file picture store")]
#[command(version)]
struct Args {
    /// When mutations are flushed to stable storage
    #[arg(long, value_enum, default_value = "every-write")]
    sync: SyncArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SyncArg {
    EveryWrite,
    OsBuffered,
}

impl From<SyncArg> for SyncStrategy {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::EveryWrite => SyncStrategy::EveryWrite,
            SyncArg::OsBuffered => SyncStrategy::OsBuffered,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the header and every stored picture
    List {
        /// Store file
        db: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new, empty store
    Create {
        /// Store file (its name must be at most 31 bytes)
        db: PathBuf,

        /// Number of directory slots (max 100000)
        #[arg(long, default_value = "10")]
        max_files: u32,

        /// Thumbnail bounding box (max 128 128)
        #[arg(long, num_args = 2, value_names = ["X_RES", "Y_RES"], default_values_t = [64, 64])]
        thumb_res: Vec<u16>,

        /// Small-image bounding box (max 512 512)
        #[arg(long, num_args = 2, value_names = ["X_RES", "Y_RES"], default_values_t = [256, 256])]
        small_res: Vec<u16>,
    },

    /// Read a picture and write it to a file
    Read {
        /// Store file
        db: PathBuf,

        /// Picture id
        id: String,

        /// thumb[nail], small or orig[inal]
        #[arg(default_value = "orig")]
        resolution: String,

        /// Output file (defaults to <id>_<resolution>.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert a picture from a file
    #[command(alias = "add")]
    Insert {
        /// Store file
        db: PathBuf,

        /// Picture id
        id: String,

        /// JPEG file to insert
        file: PathBuf,
    },

    /// Delete a picture
    Delete {
        /// Store file
        db: PathBuf,

        /// Picture id
        id: String,
    },
}

fn main() -> ExitCode {
    // stdout carries command output; keep logs on stderr and quiet by default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let sync = SyncStrategy::from(args.sync);

    match run(args.command, sync) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}: {}", e.kind_name(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, sync: SyncStrategy) -> pictdb::Result<()> {
    let resizer = JpegResizer::new();

    match command {
        Commands::List { db, json } => {
            let store = Store::open(&db, OpenMode::ReadOnly, sync)?;
            let header = store.header_summary();
            let entries = store.list_entries();
            if json {
                println!("{}", listing::to_json_full(&header, &entries)?);
            } else {
                print!("{}", listing::render_text(&header, &entries));
            }
            store.close()
        }
        Commands::Create {
            db,
            max_files,
            thumb_res,
            small_res,
        } => {
            let options = CreateOptions::new(max_files)
                .thumb(thumb_res[0], thumb_res[1])
                .small(small_res[0], small_res[1]);
            let store = Store::create(&db, &options, sync)?;
            print!("{}", store.header_summary());
            store.close()
        }
        Commands::Read {
            db,
            id,
            resolution,
            output,
        } => {
            let resolution: Resolution = resolution.parse()?;
            let mut store = Store::open(&db, OpenMode::ReadWrite, sync)?;
            let bytes = store.read(&id, resolution, &resizer)?;
            let output = output.unwrap_or_else(|| default_output(&id, resolution));
            fs::write(&output, &bytes)?;
            println!("{} bytes written to {}", bytes.len(), output.display());
            store.close()
        }
        Commands::Insert { db, id, file } => {
            let data = read_input(&file)?;
            let mut store = Store::open(&db, OpenMode::ReadWrite, sync)?;
            let slot = store.insert(&data, &id, &resizer)?;
            println!("{} inserted into slot {}", id, slot);
            store.close()
        }
        Commands::Delete { db, id } => {
            let mut store = Store::open(&db, OpenMode::ReadWrite, sync)?;
            store.delete(&id)?;
            println!("{} deleted", id);
            store.close()
        }
    }
}

fn default_output(id: &str, resolution: Resolution) -> PathBuf {
    PathBuf::from(format!("{}_{}.jpg", id, resolution))
}

fn read_input(path: &Path) -> pictdb::Result<Vec<u8>> {
    let data = fs::read(path)?;
    if data.is_empty() {
        return Err(PictDbError::InvalidArgument(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(data)
}
