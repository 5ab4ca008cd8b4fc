//! Structured error types shared across the coverage crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CoverageError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, keys, line numbers, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the filesystem path the error relates to.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the coverage pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CoverageError {
    /// The metadata document lacks the expected pallet/storage shape.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// A source marker key does not split into four components.
    #[error("malformed annotation: {0}")]
    MalformedAnnotation(ErrorInfo),
    /// A phase code outside the display table reached report formatting.
    #[error("unrecognized phase: {0}")]
    UnrecognizedPhase(ErrorInfo),
    /// The revision of the scanned tree could not be determined.
    #[error("revision error: {0}")]
    Revision(ErrorInfo),
    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// The run configuration is unreadable or invalid.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// JSON or CSV encoding failed.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// At least one fulfillment matched no requirement.
    #[error("reconciliation failure: {0}")]
    ReconciliationFailure(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CoverageError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CoverageError::Parse(info)
            | CoverageError::MalformedAnnotation(info)
            | CoverageError::UnrecognizedPhase(info)
            | CoverageError::Revision(info)
            | CoverageError::Io(info)
            | CoverageError::Config(info)
            | CoverageError::Serde(info)
            | CoverageError::ReconciliationFailure(info) => info,
        }
    }

    /// Returns the stable code of the underlying payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Builds an [`CoverageError::Io`] for a failed operation on `path`.
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        CoverageError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}
