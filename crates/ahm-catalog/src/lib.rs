//! Requirement catalog for the storage coverage pipeline.
//!
//! Runtime metadata lists pallets and their storage items. Every item of a
//! tracked pallet is expanded into one requirement per configured check;
//! excluded pallets contribute a single placeholder.

#![deny(missing_docs)]

mod catalog;
mod metadata;

pub use catalog::{Catalog, CatalogLoader};
pub use metadata::{parse_metadata, PalletStorage};
