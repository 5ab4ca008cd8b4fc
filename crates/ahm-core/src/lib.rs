#![deny(missing_docs)]
#![doc = "Shared records, errors and configuration for the AHM storage coverage pipeline."]

pub mod config;
pub mod errors;
pub mod json;
pub mod records;

pub use config::{
    CatalogConfig, CheckSpec, CoverageConfig, MalformedPolicy, PhaseDisplay, ReconcileConfig,
    ReportConfig, ScanConfig,
};
pub use errors::{CoverageError, ErrorInfo};
pub use json::to_canonical_json_pretty;
pub use records::{
    AssertionKey, Fulfillment, KeyArityError, KeyField, Namespace, Requirement, KEY_SEPARATOR,
};
