//! Matching of scanned fulfillments against the requirement catalog.
//!
//! [`Reconciler`] binds every fulfillment to at most one requirement with
//! exact-key semantics. Leftovers are anomalies, which the
//! [`SuggestionEngine`] compares against the catalog to propose the closest
//! requirement.

#![deny(missing_docs)]

mod pool;
mod reconcile;
pub mod similarity;
mod suggest;

pub use pool::FulfillmentPool;
pub use reconcile::{Binding, Reconciler, Reconciliation};
pub use suggest::{field_diffs, Diagnosis, FieldDiff, Suggestion, SuggestionEngine};
