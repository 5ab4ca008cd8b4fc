use std::path::{Path, PathBuf};

use ahm_core::config::ScanConfig;
use ahm_core::errors::{CoverageError, ErrorInfo};
use walkdir::{DirEntry, WalkDir};

fn is_artifact_dir(entry: &DirEntry, artifact_dir: &str) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == artifact_dir
}

fn has_source_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}

/// Lists source files below `root` in file-name order.
///
/// Directories named `config.artifact_dir` are pruned wherever they occur
/// below the root; their contents are never visited.
pub fn discover_sources(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, CoverageError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_artifact_dir(entry, &config.artifact_dir));
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| root.display().to_string());
            CoverageError::Io(
                ErrorInfo::new("ahm_scan.walk", err.to_string()).with_context("path", path),
            )
        })?;
        if entry.file_type().is_file() && has_source_extension(entry.path(), &config.extensions) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
