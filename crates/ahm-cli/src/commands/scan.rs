use std::error::Error;
use std::path::PathBuf;

use ahm_core::{to_canonical_json_pretty, CoverageConfig};
use ahm_scan::AnnotationScanner;
use clap::Args;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root of the source tree to scan.
    #[arg(long)]
    pub root: PathBuf,
}

pub fn run(args: &ScanArgs, config: &CoverageConfig) -> Result<(), Box<dyn Error>> {
    let output = AnnotationScanner::new(config.scan.clone())?.scan(&args.root)?;
    println!("{}", to_canonical_json_pretty(&output)?);
    Ok(())
}
