//! Coverage report generation.

#![deny(missing_docs)]

mod generator;
mod phase;
mod revision;

pub use generator::{CoverageReport, ReportGenerator, ReportRow, REPORT_HEADER};
pub use phase::PhaseTable;
pub use revision::{FixedRevision, GitRevision, RevisionSource};
