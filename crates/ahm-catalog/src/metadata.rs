use ahm_core::errors::{CoverageError, ErrorInfo};
use serde::Deserialize;

/// Storage layout of one pallet as declared by the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalletStorage {
    /// Pallet name.
    pub name: String,
    /// Storage item names, `None` when the pallet declares no storage.
    pub items: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetadataDocument {
    Versioned {
        #[serde(rename = "V14")]
        v14: PalletList,
    },
    Bare(PalletList),
}

#[derive(Debug, Deserialize)]
struct PalletList {
    pallets: Vec<PalletEntry>,
}

#[derive(Debug, Deserialize)]
struct PalletEntry {
    name: String,
    #[serde(default)]
    storage: Option<StorageSection>,
}

#[derive(Debug, Deserialize)]
struct StorageSection {
    entries: Vec<StorageEntry>,
}

#[derive(Debug, Deserialize)]
struct StorageEntry {
    name: String,
}

/// Extracts the pallet/storage layout from metadata JSON.
///
/// Accepts the versioned envelope `{"V14": {"pallets": [...]}}` as produced by
/// metadata dumps, or a bare `{"pallets": [...]}` object.
pub fn parse_metadata(bytes: &[u8]) -> Result<Vec<PalletStorage>, CoverageError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|err| {
        CoverageError::Parse(ErrorInfo::new("ahm_catalog.json", err.to_string()))
    })?;
    let document: MetadataDocument = serde_json::from_value(value).map_err(|err| {
        CoverageError::Parse(
            ErrorInfo::new("ahm_catalog.shape", err.to_string()).with_hint(
                "expected {\"V14\": {\"pallets\": [{\"name\": .., \"storage\": {\"entries\": [..]}}]}}",
            ),
        )
    })?;
    let list = match document {
        MetadataDocument::Versioned { v14 } => v14,
        MetadataDocument::Bare(list) => list,
    };
    Ok(list
        .pallets
        .into_iter()
        .map(|pallet| PalletStorage {
            name: pallet.name,
            items: pallet
                .storage
                .map(|section| section.entries.into_iter().map(|entry| entry.name).collect()),
        })
        .collect())
}
