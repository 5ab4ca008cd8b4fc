use ahm_core::errors::{CoverageError, ErrorInfo};
use ahm_core::records::Namespace;
use regex::Regex;

/// Compiled marker patterns, one per namespace.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    patterns: Vec<(Namespace, Regex)>,
}

impl MarkerSet {
    /// Compiles the storage and functionality patterns.
    pub fn new() -> Result<Self, CoverageError> {
        let patterns = Namespace::ALL
            .iter()
            .map(|namespace| {
                let source = format!(r#"Assert {}\s+"([^"]+)""#, namespace.as_str());
                Regex::new(&source)
                    .map(|regex| (*namespace, regex))
                    .map_err(|err| {
                        CoverageError::Config(
                            ErrorInfo::new("ahm_scan.pattern", err.to_string())
                                .with_context("pattern", source.clone()),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Raw keys captured from an already normalized line.
    ///
    /// With `all` unset only the first occurrence of each pattern is returned.
    pub fn extract<'l>(&self, line: &'l str, all: bool) -> Vec<(Namespace, &'l str)> {
        let mut keys = Vec::new();
        for (namespace, regex) in &self.patterns {
            let captures = regex
                .captures_iter(line)
                .filter_map(|caps| caps.get(1))
                .map(|key| (*namespace, key.as_str()));
            if all {
                keys.extend(captures);
            } else {
                keys.extend(captures.take(1));
            }
        }
        keys
    }
}

/// Trims a source line and rewrites single quotes as double quotes.
pub fn normalize_line(line: &str) -> String {
    line.trim().replace('\'', "\"")
}
