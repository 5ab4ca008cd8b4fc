use std::fmt::{self, Display};

use ahm_catalog::Catalog;
use ahm_core::records::{AssertionKey, Fulfillment, KeyField};
use serde::Serialize;

use crate::similarity::ratio;

/// One positional field where an anomaly differs from its suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    /// Position within the key.
    pub field: KeyField,
    /// Component as written in the marker.
    pub found: String,
    /// Component of the suggested requirement.
    pub suggested: String,
}

/// Closest catalog requirement for an anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Joined key of the suggested requirement.
    pub full_name: String,
    /// Key of the suggested requirement.
    pub key: AssertionKey,
    /// Similarity ratio of the two joined keys.
    pub score: f64,
    /// Differing fields in key order.
    pub diffs: Vec<FieldDiff>,
}

/// An anomaly and its suggestion, if any requirement was close enough.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    /// Marker that matched no requirement.
    pub anomaly: Fulfillment,
    /// Closest requirement above the cutoff.
    pub suggestion: Option<Suggestion>,
}

/// Advisory lookup of near-miss requirements. Never alters the catalog.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine<'c> {
    catalog: &'c Catalog,
    cutoff: f64,
}

impl<'c> SuggestionEngine<'c> {
    /// Creates an engine over `catalog`; matches below `cutoff` are ignored.
    pub fn new(catalog: &'c Catalog, cutoff: f64) -> Self {
        Self { catalog, cutoff }
    }

    /// Best requirement of the anomaly's namespace scoring at least the cutoff.
    ///
    /// Ties keep the requirement that comes first in the catalog.
    pub fn suggest(&self, anomaly: &Fulfillment) -> Option<Suggestion> {
        let wanted = anomaly.full_name();
        let mut best: Option<(f64, &AssertionKey, &str)> = None;
        for requirement in self.catalog.in_namespace(anomaly.namespace) {
            let score = ratio(&wanted, &requirement.full_name);
            if score < self.cutoff {
                continue;
            }
            if best.map_or(true, |(top, _, _)| score > top) {
                best = Some((score, &requirement.key, requirement.full_name.as_str()));
            }
        }
        best.map(|(score, key, full_name)| Suggestion {
            full_name: full_name.to_string(),
            key: key.clone(),
            score,
            diffs: field_diffs(&anomaly.key, key),
        })
    }

    /// Pairs every anomaly with its suggestion, keeping input order.
    pub fn diagnose(&self, anomalies: &[Fulfillment]) -> Vec<Diagnosis> {
        anomalies
            .iter()
            .map(|anomaly| Diagnosis {
                anomaly: anomaly.clone(),
                suggestion: self.suggest(anomaly),
            })
            .collect()
    }
}

/// Fields of `found` that differ from `suggested`.
pub fn field_diffs(found: &AssertionKey, suggested: &AssertionKey) -> Vec<FieldDiff> {
    KeyField::ALL
        .iter()
        .filter(|field| found.field(**field) != suggested.field(**field))
        .map(|field| FieldDiff {
            field: *field,
            found: found.field(*field).to_string(),
            suggested: suggested.field(*field).to_string(),
        })
        .collect()
}

impl Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.anomaly.full_name();
        match &self.suggestion {
            Some(suggestion) => {
                writeln!(f, "❌ Property \"{name}\" not found. Maybe you meant:")?;
                writeln!(f, "            \"{}\"", suggestion.full_name)?;
                for diff in &suggestion.diffs {
                    writeln!(f, "    \"{}\" → \"{}\"", diff.found, diff.suggested)?;
                }
            }
            None => writeln!(f, "❌ Property \"{name}\" not found.")?,
        }
        write!(f, "at {}", self.anomaly.abs_path)
    }
}
