use std::path::Path;
use std::process::Command;

use ahm_core::errors::{CoverageError, ErrorInfo};

/// Source of the revision identifier used in report links.
pub trait RevisionSource {
    /// Identifier of the revision checked out at `root`.
    fn revision(&self, root: &Path) -> Result<String, CoverageError>;
}

/// Asks git for the commit checked out at the scan root.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRevision;

impl RevisionSource for GitRevision {
    fn revision(&self, root: &Path) -> Result<String, CoverageError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(["rev-parse", "HEAD"])
            .output()
            .map_err(|err| {
                CoverageError::Revision(
                    ErrorInfo::new("ahm_report.git_spawn", err.to_string())
                        .with_path(root)
                        .with_hint("install git or pass --revision"),
                )
            })?;
        if !output.status.success() {
            return Err(CoverageError::Revision(
                ErrorInfo::new(
                    "ahm_report.git_rev_parse",
                    String::from_utf8_lossy(&output.stderr).trim().to_string(),
                )
                .with_path(root)
                .with_context("status", output.status.to_string()),
            ));
        }
        let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if revision.is_empty() {
            return Err(CoverageError::Revision(
                ErrorInfo::new("ahm_report.git_empty", "git returned no revision").with_path(root),
            ));
        }
        Ok(revision)
    }
}

/// Revision supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRevision(pub String);

impl RevisionSource for FixedRevision {
    fn revision(&self, _root: &Path) -> Result<String, CoverageError> {
        Ok(self.0.clone())
    }
}
