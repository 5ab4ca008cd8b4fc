use std::fs;
use std::path::Path;

use ahm_core::config::{MalformedPolicy, ScanConfig};
use ahm_core::errors::{CoverageError, ErrorInfo};
use ahm_core::records::{AssertionKey, Fulfillment, Namespace};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::marker::{normalize_line, MarkerSet};
use crate::walk::discover_sources;

/// Fulfillments of one scan, split by namespace, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutput {
    /// `Assert storage` markers.
    pub storage: Vec<Fulfillment>,
    /// `Assert functionality` markers.
    pub functionality: Vec<Fulfillment>,
}

impl ScanOutput {
    /// Fulfillments found for `namespace`.
    pub fn namespace(&self, namespace: Namespace) -> &[Fulfillment] {
        match namespace {
            Namespace::Storage => &self.storage,
            Namespace::Functionality => &self.functionality,
        }
    }

    /// Total markers across both namespaces.
    pub fn len(&self) -> usize {
        self.storage.len() + self.functionality.len()
    }

    /// True when no marker was found.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, fulfillment: Fulfillment) {
        match fulfillment.namespace {
            Namespace::Storage => self.storage.push(fulfillment),
            Namespace::Functionality => self.functionality.push(fulfillment),
        }
    }
}

impl IntoIterator for ScanOutput {
    type Item = Fulfillment;
    type IntoIter =
        std::iter::Chain<std::vec::IntoIter<Fulfillment>, std::vec::IntoIter<Fulfillment>>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.into_iter().chain(self.functionality)
    }
}

/// Walks a source tree and collects coverage markers.
#[derive(Debug, Clone)]
pub struct AnnotationScanner {
    config: ScanConfig,
    markers: MarkerSet,
}

impl AnnotationScanner {
    /// Creates a scanner, compiling the marker patterns.
    pub fn new(config: ScanConfig) -> Result<Self, CoverageError> {
        Ok(Self {
            config,
            markers: MarkerSet::new()?,
        })
    }

    /// Scans every source file below `root`.
    ///
    /// Files are read in parallel; the output keeps file-name order so repeated
    /// runs are identical. The first failing file aborts the scan.
    pub fn scan(&self, root: &Path) -> Result<ScanOutput, CoverageError> {
        let root = root
            .canonicalize()
            .map_err(|err| CoverageError::io("ahm_scan.root", root, err))?;
        let files = discover_sources(&root, &self.config)?;
        info!(root = %root.display(), files = files.len(), "scanning source tree");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|err| {
                CoverageError::Config(ErrorInfo::new("ahm_scan.thread_pool", err.to_string()))
            })?;
        let per_file: Result<Vec<Vec<Fulfillment>>, CoverageError> = pool.install(|| {
            files
                .par_iter()
                .map(|path| self.scan_file(&root, path))
                .collect()
        });

        let mut output = ScanOutput::default();
        for fulfillment in per_file?.into_iter().flatten() {
            output.push(fulfillment);
        }
        info!(
            storage = output.storage.len(),
            functionality = output.functionality.len(),
            "scan complete"
        );
        Ok(output)
    }

    /// Reads one file and extracts its markers.
    pub fn scan_file(&self, root: &Path, path: &Path) -> Result<Vec<Fulfillment>, CoverageError> {
        let content = fs::read_to_string(path)
            .map_err(|err| CoverageError::io("ahm_scan.read", path, err))?;
        if !content.contains(self.config.quick_marker.as_str()) {
            return Ok(Vec::new());
        }
        let rel = relative_display(root, path);
        let abs = path.display().to_string();
        let found = self.scan_source(&rel, &abs, &content)?;
        debug!(file = %rel, markers = found.len(), "scanned file");
        Ok(found)
    }

    /// Extracts markers from `content`, labelling them with the given paths.
    pub fn scan_source(
        &self,
        rel: &str,
        abs: &str,
        content: &str,
    ) -> Result<Vec<Fulfillment>, CoverageError> {
        let mut found = Vec::new();
        let all = self.config.all_markers_per_line;
        for (index, raw_line) in content.split('\n').enumerate() {
            let line_number = index + 1;
            let line = normalize_line(raw_line);
            for (namespace, raw_key) in self.markers.extract(&line, all) {
                let key = match AssertionKey::parse(raw_key) {
                    Ok(key) => key,
                    Err(err) => {
                        let location = format!("{abs}:{line_number}");
                        match self.config.malformed {
                            MalformedPolicy::Fail => {
                                return Err(CoverageError::MalformedAnnotation(
                                    ErrorInfo::new("ahm_scan.key_arity", err.to_string())
                                        .with_context("namespace", namespace.as_str())
                                        .with_context("location", location)
                                        .with_hint(MARKER_FORM_HINT),
                                ));
                            }
                            MalformedPolicy::Skip => {
                                warn!(%location, key = raw_key, "skipping malformed marker");
                                continue;
                            }
                        }
                    }
                };
                found.push(Fulfillment {
                    namespace,
                    key,
                    line: line_number,
                    rel_path: format!("{rel}:{line_number}"),
                    abs_path: format!("{abs}:{line_number}"),
                });
            }
        }
        Ok(found)
    }
}

const MARKER_FORM_HINT: &str = "markers take the form \"pallet::item::phase::assertion\"";

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
