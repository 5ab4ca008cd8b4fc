use std::fs;
use std::path::{Path, PathBuf};

use ahm_core::config::ReportConfig;
use ahm_core::errors::{CoverageError, ErrorInfo};
use ahm_core::records::Fulfillment;
use ahm_reconcile::Binding;
use serde::Serialize;
use tracing::info;

use crate::phase::PhaseTable;

/// Column names of the coverage table.
pub const REPORT_HEADER: [&str; 6] = ["Pallet", "Storage", "Assertion", "Chain", "When", "Link"];

/// One table row per requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Pallet name.
    pub pallet: String,
    /// Storage item, empty for placeholders.
    pub storage: String,
    /// Assertion kind.
    pub assertion: String,
    /// Chain the phase runs against.
    pub chain: String,
    /// `before` or `after` the migration.
    pub when: String,
    /// Space separated `[line N](url)` links, empty when unfulfilled.
    pub links: String,
}

impl ReportRow {
    fn record(&self) -> [&str; 6] {
        [
            self.pallet.as_str(),
            self.storage.as_str(),
            self.assertion.as_str(),
            self.chain.as_str(),
            self.when.as_str(),
            self.links.as_str(),
        ]
    }
}

/// Rendered report with its coverage summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Revision the links point at.
    pub revision: String,
    /// One row per requirement, in catalog order.
    pub rows: Vec<ReportRow>,
    /// Requirements with a bound fulfillment, plus every placeholder.
    pub satisfied: usize,
    /// Number of requirements.
    pub total: usize,
}

impl CoverageReport {
    /// Satisfied share in percent; an empty catalog reports 0.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.satisfied as f64 / self.total as f64 * 100.0
    }
}

fn report_error(code: &str, path: &Path, err: impl ToString) -> CoverageError {
    CoverageError::Serde(ErrorInfo::new(code, err.to_string()).with_path(path))
}

/// Renders bindings into rows and writes the CSV table.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    config: ReportConfig,
    phases: PhaseTable,
}

impl ReportGenerator {
    /// Creates a generator with the phase table and link base of `config`.
    pub fn new(config: ReportConfig) -> Self {
        let phases = PhaseTable::new(config.phases.clone());
        Self { config, phases }
    }

    /// Builds one row per binding, in the order given.
    pub fn generate(
        &self,
        bindings: &[Binding],
        revision: &str,
    ) -> Result<CoverageReport, CoverageError> {
        let mut rows = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let requirement = &binding.requirement;
            let (chain, when) =
                self.phases
                    .display(requirement.phase())
                    .map_err(|err| match err {
                        CoverageError::UnrecognizedPhase(info) => CoverageError::UnrecognizedPhase(
                            info.with_context("requirement", requirement.full_name.clone()),
                        ),
                        other => other,
                    })?;
            let links = binding
                .fulfillments
                .iter()
                .map(|fulfillment| self.link(fulfillment, revision))
                .collect::<Vec<_>>()
                .join(" ");
            rows.push(ReportRow {
                pallet: requirement.pallet().to_string(),
                storage: requirement.storage_item().to_string(),
                assertion: requirement.assertion_kind().to_string(),
                chain: chain.to_string(),
                when: when.to_string(),
                links,
            });
        }
        let satisfied = bindings
            .iter()
            .filter(|binding| binding.is_satisfied())
            .count();
        Ok(CoverageReport {
            revision: revision.to_string(),
            rows,
            satisfied,
            total: bindings.len(),
        })
    }

    /// Markdown link to the marker at `revision`.
    pub fn link(&self, fulfillment: &Fulfillment, revision: &str) -> String {
        format!(
            "[line {}]({}/{}/{})",
            fulfillment.line,
            self.config.link_base.trim_end_matches('/'),
            revision,
            fulfillment.rel_path
        )
    }

    /// Writes the table to `config.output_file` inside `dir`.
    pub fn write_csv(&self, report: &CoverageReport, dir: &Path) -> Result<PathBuf, CoverageError> {
        fs::create_dir_all(dir)
            .map_err(|err| CoverageError::io("ahm_report.out_dir", dir, err))?;
        let path = dir.join(&self.config.output_file);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|err| report_error("ahm_report.csv_open", &path, err))?;
        writer
            .write_record(REPORT_HEADER)
            .map_err(|err| report_error("ahm_report.csv_write", &path, err))?;
        for row in &report.rows {
            writer
                .write_record(row.record())
                .map_err(|err| report_error("ahm_report.csv_write", &path, err))?;
        }
        writer
            .flush()
            .map_err(|err| report_error("ahm_report.csv_flush", &path, err))?;
        info!(path = %path.display(), rows = report.rows.len(), "coverage table written");
        Ok(path)
    }
}
