//! Canonical JSON encoding with deterministic key order.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{CoverageError, ErrorInfo};

fn serde_error(code: &str, err: impl ToString) -> CoverageError {
    CoverageError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value as indented JSON with deterministic key ordering.
pub fn to_canonical_json_pretty<T: Serialize>(value: &T) -> Result<String, CoverageError> {
    let value =
        serde_json::to_value(value).map_err(|err| serde_error("ahm_core.json_serialize", err))?;
    serde_json::to_string_pretty(&canonicalize(value))
        .map_err(|err| serde_error("ahm_core.json_write", err))
}
