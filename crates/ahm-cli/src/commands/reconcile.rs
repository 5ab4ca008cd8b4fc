use std::error::Error;
use std::path::PathBuf;

use ahm_catalog::CatalogLoader;
use ahm_core::{CoverageConfig, CoverageError, ErrorInfo, Namespace};
use ahm_reconcile::{Reconciler, SuggestionEngine};
use ahm_report::{FixedRevision, GitRevision, ReportGenerator, RevisionSource};
use ahm_scan::AnnotationScanner;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Root of the source tree holding the markers.
    #[arg(long)]
    pub root: PathBuf,
    /// Runtime metadata JSON the requirements are derived from.
    #[arg(long)]
    pub metadata: PathBuf,
    /// Directory receiving the coverage table.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Revision used in links instead of asking git.
    #[arg(long)]
    pub revision: Option<String>,
}

pub fn run(args: &ReconcileArgs, config: &CoverageConfig) -> Result<(), Box<dyn Error>> {
    let catalog = CatalogLoader::new(config.catalog.clone()).load_path(&args.metadata)?;
    println!("Found {} storage requirements", catalog.len());

    let scan = AnnotationScanner::new(config.scan.clone())?.scan(&args.root)?;
    println!(
        "Found {} storage and {} functional fulfillments",
        scan.namespace(Namespace::Storage).len(),
        scan.namespace(Namespace::Functionality).len()
    );

    let revision = match &args.revision {
        Some(revision) => FixedRevision(revision.clone()).revision(&args.root)?,
        None => GitRevision.revision(&args.root)?,
    };
    info!(%revision, "resolved revision");

    let outcome = Reconciler::new(config.reconcile.clone()).reconcile_with(
        &catalog,
        scan,
        |requirement, ordinal| {
            if ordinal == 0 {
                println!("✅ Requirement fulfilled \"{}\"", requirement.full_name);
            } else {
                println!("✅ Requirement fulfilled \"{}\" #{ordinal}", requirement.full_name);
            }
        },
    );

    let engine = SuggestionEngine::new(&catalog, config.reconcile.suggestion_cutoff);
    for diagnosis in engine.diagnose(&outcome.anomalies) {
        println!("\n{diagnosis}\n");
    }

    let generator = ReportGenerator::new(config.report.clone());
    let report = generator.generate(&outcome.bindings, &revision)?;
    println!("Coverage: {:.2}%", report.percentage());
    let path = generator.write_csv(&report, &args.out)?;
    println!(
        "Wrote {} storage requirements to {}",
        report.rows.len(),
        path.display()
    );

    if !outcome.is_success() {
        return Err(Box::new(CoverageError::ReconciliationFailure(
            ErrorInfo::new(
                "ahm_cli.anomalies",
                format!("{} fulfillment(s) match no requirement", outcome.anomalies.len()),
            )
            .with_context("report", path.display().to_string()),
        )));
    }
    Ok(())
}
