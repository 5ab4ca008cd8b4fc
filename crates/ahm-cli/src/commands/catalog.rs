use std::error::Error;
use std::path::PathBuf;

use ahm_catalog::CatalogLoader;
use ahm_core::{to_canonical_json_pretty, CoverageConfig};
use clap::Args;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Runtime metadata JSON (e.g. polkadot.metadata.json).
    #[arg(long)]
    pub metadata: PathBuf,
}

pub fn run(args: &CatalogArgs, config: &CoverageConfig) -> Result<(), Box<dyn Error>> {
    let catalog = CatalogLoader::new(config.catalog.clone()).load_path(&args.metadata)?;
    println!("{}", to_canonical_json_pretty(&catalog)?);
    Ok(())
}
