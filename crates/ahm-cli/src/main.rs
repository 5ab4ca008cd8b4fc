use std::error::Error;
use std::path::{Path, PathBuf};

use ahm_core::CoverageConfig;
use clap::{Parser, Subcommand};
use commands::{
    catalog::{self, CatalogArgs},
    reconcile::{self, ReconcileArgs},
    scan::{self, ScanArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "ahm-coverage",
    version,
    about = "Storage migration test coverage for Asset Hub"
)]
struct Cli {
    /// TOML file overriding the built-in configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the requirement catalog derived from runtime metadata.
    Catalog(CatalogArgs),
    /// Print every coverage marker found in a source tree as JSON.
    Scan(ScanArgs),
    /// Match markers against the catalog and write the coverage table.
    Reconcile(ReconcileArgs),
}

fn load_config(path: Option<&Path>) -> Result<CoverageConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(CoverageConfig::load(path)?),
        None => Ok(CoverageConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Catalog(args) => catalog::run(&args, &config),
        Command::Scan(args) => scan::run(&args, &config),
        Command::Reconcile(args) => reconcile::run(&args, &config),
    }
}
