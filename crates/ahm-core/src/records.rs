//! Requirement and fulfillment records exchanged between pipeline stages.

use std::fmt::{self, Display};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Separator between the four components of an assertion key.
pub const KEY_SEPARATOR: &str = "::";

/// Disjoint marker namespaces. Records of different namespaces never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// `Assert storage "pallet::item::phase::assertion"`.
    Storage,
    /// `Assert functionality "pallet::extrinsic::functionality::assertion"`.
    Functionality,
}

impl Namespace {
    /// Every namespace, in marker declaration order.
    pub const ALL: [Namespace; 2] = [Namespace::Storage, Namespace::Functionality];

    /// Keyword following `Assert` in source markers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Storage => "storage",
            Namespace::Functionality => "functionality",
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional component of an [`AssertionKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    /// Pallet name.
    Pallet,
    /// Storage item, or extrinsic in the functionality namespace.
    Item,
    /// Migration phase, or functionality name in the functionality namespace.
    Phase,
    /// Assertion kind.
    Assertion,
}

impl KeyField {
    /// Fields in key order.
    pub const ALL: [KeyField; 4] = [
        KeyField::Pallet,
        KeyField::Item,
        KeyField::Phase,
        KeyField::Assertion,
    ];

    /// Column name used when serializing records of `namespace`.
    pub fn label(&self, namespace: Namespace) -> &'static str {
        match (self, namespace) {
            (KeyField::Pallet, _) => "pallet",
            (KeyField::Item, Namespace::Storage) => "storage",
            (KeyField::Item, Namespace::Functionality) => "extrinsic",
            (KeyField::Phase, Namespace::Storage) => "when",
            (KeyField::Phase, Namespace::Functionality) => "functionality",
            (KeyField::Assertion, _) => "assertion",
        }
    }
}

/// Raised when a marker key does not have exactly four components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key `{raw}` has {found} `::`-separated components, expected 4")]
pub struct KeyArityError {
    /// Key as captured from the source line.
    pub raw: String,
    /// Number of components found.
    pub found: usize,
}

/// Exact match key shared by requirements and fulfillments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssertionKey {
    /// Pallet name.
    pub pallet: String,
    /// Storage item (or extrinsic).
    pub item: String,
    /// Phase code (or functionality).
    pub phase: String,
    /// Assertion kind.
    pub assertion: String,
}

impl AssertionKey {
    /// Builds a key from its four components.
    pub fn new(
        pallet: impl Into<String>,
        item: impl Into<String>,
        phase: impl Into<String>,
        assertion: impl Into<String>,
    ) -> Self {
        Self {
            pallet: pallet.into(),
            item: item.into(),
            phase: phase.into(),
            assertion: assertion.into(),
        }
    }

    /// Parses `pallet::item::phase::assertion`, rejecting any other arity.
    pub fn parse(raw: &str) -> Result<Self, KeyArityError> {
        let parts: Vec<&str> = raw.trim().split(KEY_SEPARATOR).collect();
        match parts.as_slice() {
            [pallet, item, phase, assertion] => Ok(Self::new(*pallet, *item, *phase, *assertion)),
            _ => Err(KeyArityError {
                raw: raw.to_string(),
                found: parts.len(),
            }),
        }
    }

    /// Returns the component stored at `field`.
    pub fn field(&self, field: KeyField) -> &str {
        match field {
            KeyField::Pallet => &self.pallet,
            KeyField::Item => &self.item,
            KeyField::Phase => &self.phase,
            KeyField::Assertion => &self.assertion,
        }
    }

    /// Joins the components with [`KEY_SEPARATOR`].
    pub fn full_name(&self) -> String {
        [
            self.pallet.as_str(),
            self.item.as_str(),
            self.phase.as_str(),
            self.assertion.as_str(),
        ]
        .join(KEY_SEPARATOR)
    }
}

impl Display for AssertionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// One expected verification point of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Namespace the requirement is matched in.
    pub namespace: Namespace,
    /// Exact match key.
    pub key: AssertionKey,
    /// Joined key, unique within a well-formed catalog.
    pub full_name: String,
    /// Placeholder for an excluded pallet; always counts as satisfied.
    pub excluded: bool,
}

impl Requirement {
    /// Creates a requirement that must be fulfilled by a marker.
    pub fn expected(namespace: Namespace, key: AssertionKey) -> Self {
        let full_name = key.full_name();
        Self {
            namespace,
            key,
            full_name,
            excluded: false,
        }
    }

    /// Creates the single placeholder emitted for an excluded pallet.
    pub fn placeholder(pallet: impl Into<String>) -> Self {
        let key = AssertionKey::new(pallet, "", "", "");
        let full_name = key.full_name();
        Self {
            namespace: Namespace::Storage,
            key,
            full_name,
            excluded: true,
        }
    }

    /// Pallet name.
    pub fn pallet(&self) -> &str {
        &self.key.pallet
    }

    /// Storage item name, empty for placeholders.
    pub fn storage_item(&self) -> &str {
        &self.key.item
    }

    /// Phase code, empty for placeholders.
    pub fn phase(&self) -> &str {
        &self.key.phase
    }

    /// Assertion kind, empty for placeholders.
    pub fn assertion_kind(&self) -> &str {
        &self.key.assertion
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("full_name", &self.full_name)?;
        map.serialize_entry("namespace", &self.namespace)?;
        for field in KeyField::ALL {
            map.serialize_entry(field.label(self.namespace), self.key.field(field))?;
        }
        map.serialize_entry("excluded", &self.excluded)?;
        map.end()
    }
}

/// One marker found in the scanned source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    /// Namespace of the marker keyword.
    pub namespace: Namespace,
    /// Key captured from the marker.
    pub key: AssertionKey,
    /// 1-indexed line of the marker.
    pub line: usize,
    /// `path:line` relative to the scan root, `/`-separated.
    pub rel_path: String,
    /// `path:line` with an absolute path.
    pub abs_path: String,
}

impl Fulfillment {
    /// Joined key of the marker.
    pub fn full_name(&self) -> String {
        self.key.full_name()
    }
}

impl Serialize for Fulfillment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("full_name", &self.full_name())?;
        for field in KeyField::ALL {
            map.serialize_entry(field.label(self.namespace), self.key.field(field))?;
        }
        map.serialize_entry("rel_path", &self.rel_path)?;
        map.serialize_entry("abs_path", &self.abs_path)?;
        map.end()
    }
}
