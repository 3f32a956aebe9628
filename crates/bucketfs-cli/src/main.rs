//! Bucketfs CLI - Browse an object-store listing as a filesystem tree
//!
//! The listing comes from a manifest file: a JSON array of object metadata
//! (`[{"key": "a/b.txt", "etag": "\"..\"", "size": 3}, ...]`).
//!
//! Usage:
//!   bucketfs -m listing.json ls /docs          # List a folder
//!   bucketfs -m listing.json tree              # Print the whole tree
//!   bucketfs -m listing.json stat /docs/a.md   # Show node metadata as JSON
//!   bucketfs -m listing.json put /b.txt ./b    # Upload and save the manifest

mod commands;

use anyhow::{Context, Result};
use bucketfs::{BucketFs, DEFAULT_PAGE_SIZE, FsConfig, InMemoryStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Bucketfs - Object-store listings as a cached filesystem tree
#[derive(Parser, Debug)]
#[command(name = "bucketfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listing manifest (JSON array of object metadata)
    #[arg(short, long)]
    manifest: PathBuf,

    /// JSON config file with `bucket` and `prefix`
    #[arg(short, long, conflicts_with_all = ["bucket", "prefix"])]
    config: Option<PathBuf>,

    /// Bucket name
    #[arg(long, default_value = "local")]
    bucket: String,

    /// Key prefix used as the filesystem root
    #[arg(long, default_value = "")]
    prefix: String,

    /// Keys returned per listing page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Log build progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a file or folder as JSON
    Stat {
        path: String,
    },
    /// List the direct children of a folder
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print everything below a folder
    Tree {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Upload a local file to a path and save the manifest
    Put {
        path: String,
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "bucketfs=info",
        _ => "bucketfs=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Args) -> Result<FsConfig> {
    match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            FsConfig::from_json(&json).with_context(|| format!("Invalid config: {}", path.display()))
        }
        None => {
            let config = FsConfig::new(args.bucket.as_str()).prefix(&args.prefix);
            config.validate().context("Invalid bucket or prefix")?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let objects = commands::load_manifest(&args.manifest)?;
    let store = Arc::new(InMemoryStore::from_objects(objects, args.page_size));

    let fs = BucketFs::new(store.clone(), config)
        .await
        .context("Failed to build bucket tree")?;
    tracing::info!(stats = ?fs.stats(), "tree ready");

    let output = match &args.command {
        Command::Stat { path } => commands::stat(&fs, path)? + "\n",
        Command::Ls { path } => commands::ls(&fs, path)?,
        Command::Tree { path } => commands::tree(&fs, path)?,
        Command::Put { path, file } => {
            commands::put(&fs, &store, &args.manifest, path, file).await?
        }
    };
    print!("{output}");
    Ok(())
}
