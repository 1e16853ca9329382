//! Per-type strategy cache.
//!
//! Lookups are concurrent. A missing strategy is built outside the map lock
//! and then offered to the map; if another thread inserted one first, the
//! local copy is dropped. Strategies are cheap to build and free of side
//! effects, so losing that race costs nothing.

use crate::descriptor::TypeKey;
use crate::strategy::{Strategy, Subject};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct StrategyRegistry {
    strategies: DashMap<TypeKey, Arc<Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: DashMap::new(),
        }
    }

    /// Number of types with a cached strategy.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.strategies.contains_key(key)
    }

    /// Strategy for the subject's concrete type, built on first use.
    ///
    /// Returns an owned `Arc`: callers recurse while using the strategy and
    /// must not hold a map guard meanwhile, or a nested insertion into the
    /// same shard would deadlock.
    pub(crate) fn strategy_for(&self, subject: Subject<'_>) -> Arc<Strategy> {
        let key = subject.type_key();
        if let Some(found) = self.strategies.get(&key) {
            return Arc::clone(found.value());
        }

        // Descriptors are user code; never run them under the map lock.
        let built = Arc::new(Strategy::select(key, &subject.descriptor()));
        match self.strategies.entry(key) {
            Entry::Occupied(existing) => {
                tracing::trace!(type_name = key.name(), "strategy built concurrently, keeping the first");
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    type_name = key.name(),
                    strategy = %built.kind(),
                    "registered structural strategy"
                );
                Arc::clone(slot.insert(built).value())
            }
        }
    }
}
