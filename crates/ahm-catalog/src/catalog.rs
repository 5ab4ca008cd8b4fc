use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use ahm_core::config::CatalogConfig;
use ahm_core::errors::CoverageError;
use ahm_core::records::{AssertionKey, Namespace, Requirement};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::metadata::{parse_metadata, PalletStorage};

/// Ordered, immutable set of requirements.
///
/// Duplicate full names are kept; the reconciler credits the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    requirements: Vec<Requirement>,
}

impl Catalog {
    /// Wraps requirements in catalog order.
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    /// Requirements in catalog order.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Iterates requirements in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }

    /// Requirements matched in `namespace`.
    pub fn in_namespace(&self, namespace: Namespace) -> impl Iterator<Item = &Requirement> {
        self.requirements
            .iter()
            .filter(move |req| req.namespace == namespace)
    }

    /// Number of requirements, placeholders included.
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// True when the metadata produced no requirement.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// First requirement with the given full name.
    pub fn get(&self, full_name: &str) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|req| req.full_name == full_name)
    }

    /// Number of excluded-pallet placeholders.
    pub fn placeholder_count(&self) -> usize {
        self.requirements.iter().filter(|req| req.excluded).count()
    }

    /// Full names occurring more than once, sorted.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = BTreeSet::new();
        for req in &self.requirements {
            if !seen.insert(req.full_name.as_str()) {
                duplicates.insert(req.full_name.clone());
            }
        }
        duplicates.into_iter().collect()
    }
}

/// Builds a [`Catalog`] from runtime metadata.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    config: CatalogConfig,
}

impl CatalogLoader {
    /// Creates a loader using the exclusion set and checks of `config`.
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Reads a metadata JSON file and builds the catalog.
    pub fn load_path(&self, path: &Path) -> Result<Catalog, CoverageError> {
        info!(path = %path.display(), "reading metadata");
        let bytes =
            fs::read(path).map_err(|err| CoverageError::io("ahm_catalog.read", path, err))?;
        self.load_slice(&bytes).map_err(|err| match err {
            CoverageError::Parse(info) => CoverageError::Parse(info.with_path(path)),
            other => other,
        })
    }

    /// Parses metadata JSON bytes and builds the catalog.
    pub fn load_slice(&self, bytes: &[u8]) -> Result<Catalog, CoverageError> {
        let pallets = parse_metadata(bytes)?;
        Ok(self.build(&pallets))
    }

    /// Expands pallet storage layouts into requirements, in pallet order.
    pub fn build(&self, pallets: &[PalletStorage]) -> Catalog {
        let excluded: HashSet<&str> = self
            .config
            .excluded_pallets
            .iter()
            .map(String::as_str)
            .collect();
        let mut requirements = Vec::new();
        for pallet in pallets {
            // Pallets without a storage section hold no migrated state.
            let Some(items) = &pallet.items else {
                debug!(pallet = %pallet.name, "pallet declares no storage");
                continue;
            };
            if excluded.contains(pallet.name.as_str()) {
                requirements.push(Requirement::placeholder(pallet.name.clone()));
                continue;
            }
            for item in items {
                for check in &self.config.checks {
                    requirements.push(Requirement::expected(
                        Namespace::Storage,
                        AssertionKey::new(
                            pallet.name.clone(),
                            item.clone(),
                            check.phase.clone(),
                            check.assertion.clone(),
                        ),
                    ));
                }
            }
        }
        let catalog = Catalog::new(requirements);
        for name in catalog.duplicate_names() {
            warn!(requirement = %name, "duplicate requirement in catalog; first entry wins");
        }
        info!(
            requirements = catalog.len(),
            placeholders = catalog.placeholder_count(),
            "catalog built"
        );
        catalog
    }
}
