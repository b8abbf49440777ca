//! Thin orchestrator around the menucat pipeline: file-based imports for
//! development and backfills. Persistence here is plain JSON artifacts; the
//! pipeline stages themselves stay pure.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use menucat_core::SourceType;

mod hash;
mod import;

#[derive(Debug, Parser)]
#[command(name = "menucat")]
#[command(about = "menucat catalog import pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a feed file through parse → merge → build-views and persist the
    /// resulting JSON artifacts.
    Import(ImportArgs),
    /// Print the canonical content hash of a feed payload.
    Hash(HashArgs),
}

#[derive(Debug, clap::Args)]
struct ImportArgs {
    /// Path to the raw feed payload (JSON array in the format's native shape).
    #[arg(long)]
    input: PathBuf,
    /// Feed format: cannmenus, pos, or spreadsheet.
    #[arg(long)]
    format: SourceType,
    /// Tenant the batch belongs to.
    #[arg(long)]
    tenant: String,
    /// Identifier of the concrete feed/location, e.g. a store slug.
    #[arg(long)]
    source_id: String,
    /// Mapping snapshot file. Defaults to `<data dir>/mappings-<tenant>.json`.
    #[arg(long)]
    mappings: Option<PathBuf>,
    /// Output directory for import artifacts. Defaults to the data dir.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct HashArgs {
    /// Path to the payload to hash.
    #[arg(long)]
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = menucat_core::load_app_config_from_env()?;
    let cli = Cli::parse();
    match cli.command {
        Commands::Import(args) => import::run(&args, &config),
        Commands::Hash(args) => hash::run(&args),
    }
}
