use ahm_catalog::Catalog;
use ahm_core::config::ReconcileConfig;
use ahm_core::records::{Fulfillment, Requirement};
use serde::Serialize;
use tracing::{debug, info};

use crate::pool::FulfillmentPool;

/// A requirement together with every fulfillment credited to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Requirement from the catalog.
    pub requirement: Requirement,
    /// Markers bound to it, in scan order.
    pub fulfillments: Vec<Fulfillment>,
}

impl Binding {
    /// Placeholders are satisfied without markers; everything else needs one.
    pub fn is_satisfied(&self) -> bool {
        self.requirement.excluded || !self.fulfillments.is_empty()
    }
}

/// Outcome of matching a scan against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// One binding per requirement, in catalog order.
    pub bindings: Vec<Binding>,
    /// Fulfillments of tracked namespaces that matched no requirement.
    pub anomalies: Vec<Fulfillment>,
    /// Fulfillments of namespaces that are not reconciled.
    pub untracked: Vec<Fulfillment>,
}

impl Reconciliation {
    /// True when no anomaly was found.
    pub fn is_success(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Number of fulfillments credited to some requirement.
    pub fn consumed(&self) -> usize {
        self.bindings
            .iter()
            .map(|binding| binding.fulfillments.len())
            .sum()
    }
}

/// Exact-key matcher with consume-once semantics.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Creates a reconciler for the namespaces tracked by `config`.
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Same as [`Reconciler::reconcile_with`] without progress reporting.
    pub fn reconcile(
        &self,
        catalog: &Catalog,
        fulfillments: impl IntoIterator<Item = Fulfillment>,
    ) -> Reconciliation {
        self.reconcile_with(catalog, fulfillments, |_, _| {})
    }

    /// Matches fulfillments to requirements, reporting each binding.
    ///
    /// Requirements are visited in catalog order and take every remaining
    /// fulfillment with their key, so a key duplicated in the catalog is only
    /// credited to its first occurrence. `on_bind` receives the requirement
    /// and the zero-based ordinal of each fulfillment bound to it.
    pub fn reconcile_with<F>(
        &self,
        catalog: &Catalog,
        fulfillments: impl IntoIterator<Item = Fulfillment>,
        mut on_bind: F,
    ) -> Reconciliation
    where
        F: FnMut(&Requirement, usize),
    {
        let (tracked, untracked): (Vec<_>, Vec<_>) = fulfillments
            .into_iter()
            .partition(|ful| self.config.tracks(ful.namespace));
        let mut pool = FulfillmentPool::new(tracked);

        let mut bindings = Vec::with_capacity(catalog.len());
        for requirement in catalog.iter() {
            let bound = if self.config.tracks(requirement.namespace) {
                pool.take_all(requirement.namespace, &requirement.key)
            } else {
                Vec::new()
            };
            for ordinal in 0..bound.len() {
                on_bind(requirement, ordinal);
            }
            debug!(
                requirement = %requirement.full_name,
                bound = bound.len(),
                "requirement matched"
            );
            bindings.push(Binding {
                requirement: requirement.clone(),
                fulfillments: bound,
            });
        }

        let anomalies = pool.into_remaining();
        for anomaly in &anomalies {
            debug!(key = %anomaly.key, location = %anomaly.abs_path, "unmatched fulfillment");
        }
        let outcome = Reconciliation {
            bindings,
            anomalies,
            untracked,
        };
        info!(
            requirements = outcome.bindings.len(),
            consumed = outcome.consumed(),
            anomalies = outcome.anomalies.len(),
            untracked = outcome.untracked.len(),
            "reconciliation complete"
        );
        outcome
    }
}
