//! Coupon tooling entry point.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use common::RequestContext;
use coupons::CouponError;
use store::PostgresStore;
use tracing_subscriber::EnvFilter;

/// Coupon list tooling for the kart order backend
#[derive(Debug, Parser)]
#[command(name = "coupons")]
#[command(about = "Filter coupon lists and seed the coupon registry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the codes that appear in at least two of the given files
    Valid {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Insert one code per line into the registry at DATABASE_URL
    Seed { file: PathBuf },
}

fn open(path: &Path) -> Result<BufReader<File>, CouponError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CouponError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn print_valid(paths: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let sources = paths.iter().map(|p| open(p)).collect::<Result<Vec<_>, _>>()?;
    let codes = coupons::valid_codes(sources)?;

    let mut out = BufWriter::new(io::stdout().lock());
    for code in &codes {
        writeln!(out, "{code}")?;
    }
    out.flush()?;
    tracing::info!(count = codes.len(), "valid coupons written");
    Ok(())
}

async fn seed_database(path: &Path) -> Result<(), Box<dyn Error>> {
    let url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(5);

    let codes = coupons::read_codes(open(path)?)?;
    let store = PostgresStore::connect(&url, max_connections).await?;
    store.run_migrations().await?;

    let inserted = coupons::seed(&store, &RequestContext::new(), &codes).await?;
    tracing::info!(read = codes.len(), inserted, "coupons seeded");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Valid { files } => print_valid(&files),
        Command::Seed { file } => seed_database(&file).await,
    }
}
