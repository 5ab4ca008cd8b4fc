//! Run configuration passed into every pipeline stage.
//!
//! The defaults reproduce the Asset Hub migration coverage setup; a TOML file
//! may override any section.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CoverageError, ErrorInfo};
use crate::records::Namespace;

/// Pallets without migrated state. Each yields one always-satisfied placeholder.
pub const DEFAULT_EXCLUDED_PALLETS: &[&str] = &[
    "AhMigrator",
    "AhOps",
    "Auctions",
    "AuthorityDiscovery",
    "Authorship",
    "Babe",
    "Beefy",
    "BeefyMmrLeaf",
    "CollatorSelection",
    "Configuration",
    "CoretimeAssignmentProvider",
    "Dmp",
    "ElectionProviderMultiPhase",
    "Grandpa",
    "Historical",
    "Hrmp",
    "Initializer",
    "MessageQueue",
    "Mmr",
    "OnDemand",
    "ParaInclusion",
    "ParaInherent",
    "Paras",
    "ParaScheduler",
    "ParasDisputes",
    "ParaSessionInfo",
    "ParasShared",
    "ParasSlashing",
    "PolkadotXcm",
    "RcMigrator",
    "Registrar",
    "Session",
    "StateTrieMigration",
    "System",
    "Timestamp",
    "TransactionPayment",
    "XcmPallet",
    "XcmpQueue",
];

/// Top level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    /// Requirement catalog construction.
    pub catalog: CatalogConfig,
    /// Source tree scanning.
    pub scan: ScanConfig,
    /// Matching and suggestions.
    pub reconcile: ReconcileConfig,
    /// Report rendering.
    pub report: ReportConfig,
}

/// One (phase, assertion) pair every storage item must be checked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Phase code, e.g. `ah_post`.
    pub phase: String,
    /// Assertion kind, e.g. `length`.
    pub assertion: String,
}

impl CheckSpec {
    /// Creates a check from its phase code and assertion kind.
    pub fn new(phase: impl Into<String>, assertion: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            assertion: assertion.into(),
        }
    }
}

/// Settings for the requirement catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Pallets that only receive a placeholder requirement.
    pub excluded_pallets: Vec<String>,
    /// Checks expanded for every storage item.
    pub checks: Vec<CheckSpec>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            excluded_pallets: DEFAULT_EXCLUDED_PALLETS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            checks: vec![
                // Asset Hub storage is empty before the migration.
                CheckSpec::new("ah_pre", "empty"),
                // Relay storage is removed by the migration.
                CheckSpec::new("rc_post", "empty"),
                CheckSpec::new("ah_post", "length"),
                CheckSpec::new("ah_post", "consistent"),
                // Asset Hub holds the values we expect.
                CheckSpec::new("ah_post", "correct"),
            ],
        }
    }
}

/// What to do with a marker whose key does not have four components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Abort the scan with [`CoverageError::MalformedAnnotation`].
    #[default]
    Fail,
    /// Log a warning and drop the marker.
    Skip,
}

/// Settings for the annotation scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory name never descended into, at any depth.
    pub artifact_dir: String,
    /// File extensions (without the dot) that are scanned.
    pub extensions: Vec<String>,
    /// Files lacking this substring are skipped without line inspection.
    pub quick_marker: String,
    /// Handling of keys with the wrong number of components.
    pub malformed: MalformedPolicy,
    /// Extract every marker of a line instead of the first per pattern.
    pub all_markers_per_line: bool,
    /// Worker threads for per-file scanning; 0 lets rayon decide.
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            artifact_dir: "target".into(),
            extensions: vec!["rs".into()],
            quick_marker: "Assert".into(),
            malformed: MalformedPolicy::Fail,
            all_markers_per_line: false,
            threads: 0,
        }
    }
}

/// Settings for the reconciler and the suggestion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Namespaces whose leftover fulfillments are anomalies.
    pub namespaces: Vec<Namespace>,
    /// Minimum similarity ratio for a suggestion.
    pub suggestion_cutoff: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            namespaces: vec![Namespace::Storage],
            suggestion_cutoff: 0.5,
        }
    }
}

impl ReconcileConfig {
    /// Returns true when leftovers of `namespace` count as anomalies.
    pub fn tracks(&self, namespace: Namespace) -> bool {
        self.namespaces.contains(&namespace)
    }
}

/// Display of one phase code in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDisplay {
    /// Phase code as used in marker keys.
    pub code: String,
    /// Chain the check runs against.
    pub chain: String,
    /// `before` or `after` the migration.
    pub when: String,
}

impl PhaseDisplay {
    /// Creates a table entry.
    pub fn new(code: &str, chain: &str, when: &str) -> Self {
        Self {
            code: code.into(),
            chain: chain.into(),
            when: when.into(),
        }
    }
}

/// Settings for the report generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Prefix of deep links; the revision and relative path are appended.
    pub link_base: String,
    /// File name of the CSV table.
    pub output_file: String,
    /// Display table for non-empty phase codes.
    pub phases: Vec<PhaseDisplay>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            link_base: "https://github.com/polkadot-fellows/runtimes/tree".into(),
            output_file: "storage.csv".into(),
            phases: vec![
                PhaseDisplay::new("ah_pre", "Asset Hub", "before"),
                PhaseDisplay::new("rc_pre", "Relay", "before"),
                PhaseDisplay::new("ah_post", "Asset Hub", "after"),
                PhaseDisplay::new("rc_post", "Relay", "after"),
            ],
        }
    }
}

fn config_error(code: &str, message: impl Into<String>) -> CoverageError {
    CoverageError::Config(ErrorInfo::new(code, message))
}

impl CoverageConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, CoverageError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            CoverageError::Config(
                ErrorInfo::new("ahm_core.config_read", format!("failed to read config: {err}"))
                    .with_path(path),
            )
        })?;
        let config = Self::from_toml_str(&contents).map_err(|err| match err {
            CoverageError::Config(info) => CoverageError::Config(info.with_path(path)),
            other => other,
        })?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, CoverageError> {
        let config: CoverageConfig = toml::from_str(contents)
            .map_err(|err| config_error("ahm_core.config_parse", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), CoverageError> {
        if self.scan.extensions.is_empty() {
            return Err(CoverageError::Config(
                ErrorInfo::new("ahm_core.config_extensions", "no source extensions configured")
                    .with_hint("set scan.extensions, e.g. [\"rs\"]"),
            ));
        }
        if self.scan.artifact_dir.trim().is_empty() {
            return Err(config_error(
                "ahm_core.config_artifact_dir",
                "scan.artifact_dir must not be empty",
            ));
        }
        let cutoff = self.reconcile.suggestion_cutoff;
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(CoverageError::Config(
                ErrorInfo::new(
                    "ahm_core.config_cutoff",
                    "suggestion cutoff must lie within 0.0..=1.0",
                )
                .with_context("cutoff", cutoff.to_string()),
            ));
        }
        let mut codes = BTreeSet::new();
        for phase in &self.report.phases {
            if phase.code.is_empty() {
                return Err(config_error(
                    "ahm_core.config_phase",
                    "the empty phase code is implicit and cannot be configured",
                ));
            }
            if !codes.insert(phase.code.as_str()) {
                return Err(CoverageError::Config(
                    ErrorInfo::new("ahm_core.config_phase", "duplicate phase code")
                        .with_context("code", phase.code.clone()),
                ));
            }
        }
        for check in &self.catalog.checks {
            if !codes.contains(check.phase.as_str()) {
                return Err(CoverageError::Config(
                    ErrorInfo::new(
                        "ahm_core.config_check_phase",
                        "catalog check uses a phase missing from the report table",
                    )
                    .with_context("phase", check.phase.clone()),
                ));
            }
        }
        Ok(())
    }
}
