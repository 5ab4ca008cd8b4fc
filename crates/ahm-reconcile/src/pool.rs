use std::collections::HashMap;

use ahm_core::records::{AssertionKey, Fulfillment, Namespace};

/// Owned worklist of unconsumed fulfillments.
///
/// Each fulfillment sits in exactly one slot; taking it empties the slot, so a
/// fulfillment can be handed out at most once however often its key is
/// requested.
#[derive(Debug, Default)]
pub struct FulfillmentPool {
    slots: Vec<Option<Fulfillment>>,
    index: HashMap<Namespace, HashMap<AssertionKey, Vec<usize>>>,
}

impl FulfillmentPool {
    /// Indexes `fulfillments` by namespace and key, keeping their order.
    pub fn new(fulfillments: impl IntoIterator<Item = Fulfillment>) -> Self {
        let mut pool = Self::default();
        for fulfillment in fulfillments {
            let slot = pool.slots.len();
            pool.index
                .entry(fulfillment.namespace)
                .or_default()
                .entry(fulfillment.key.clone())
                .or_default()
                .push(slot);
            pool.slots.push(Some(fulfillment));
        }
        pool
    }

    /// Removes and returns every remaining fulfillment with this key.
    pub fn take_all(&mut self, namespace: Namespace, key: &AssertionKey) -> Vec<Fulfillment> {
        let Some(slots) = self
            .index
            .get_mut(&namespace)
            .and_then(|by_key| by_key.remove(key))
        else {
            return Vec::new();
        };
        slots
            .into_iter()
            .filter_map(|slot| self.slots[slot].take())
            .collect()
    }

    /// Number of fulfillments not yet taken.
    pub fn remaining(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Consumes the pool, returning leftovers in insertion order.
    pub fn into_remaining(self) -> Vec<Fulfillment> {
        self.slots.into_iter().flatten().collect()
    }
}
