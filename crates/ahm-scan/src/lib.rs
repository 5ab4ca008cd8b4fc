//! Scanner for `Assert storage` / `Assert functionality` markers.

#![deny(missing_docs)]

mod marker;
mod scanner;
mod walk;

pub use marker::{normalize_line, MarkerSet};
pub use scanner::{AnnotationScanner, ScanOutput};
pub use walk::discover_sources;
