use ahm_core::config::PhaseDisplay;
use ahm_core::errors::{CoverageError, ErrorInfo};

/// Closed mapping from phase codes to `(chain, when)` display pairs.
///
/// The empty code always maps to an empty pair; it marks placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTable {
    entries: Vec<PhaseDisplay>,
}

impl PhaseTable {
    /// Builds the table from configured entries.
    pub fn new(entries: Vec<PhaseDisplay>) -> Self {
        Self { entries }
    }

    /// Returns the `(chain, when)` pair for `code`.
    pub fn display(&self, code: &str) -> Result<(&str, &str), CoverageError> {
        if code.is_empty() {
            return Ok(("", ""));
        }
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| (entry.chain.as_str(), entry.when.as_str()))
            .ok_or_else(|| {
                let known: Vec<&str> =
                    self.entries.iter().map(|entry| entry.code.as_str()).collect();
                CoverageError::UnrecognizedPhase(
                    ErrorInfo::new("ahm_report.phase", format!("unknown phase code `{code}`"))
                        .with_context("code", code)
                        .with_hint(format!("known codes: {}", known.join(", "))),
                )
            })
    }
}
