//! Shape-keyed plan cache.
//!
//! Plans depend only on `(leaf_count, capacity)`, never on leaf values, so a
//! service that reduces many leaf sets of the same shape plans once and
//! shares the result. Planning failures are returned but not cached.

use crate::planner::plan;
use mpmerkle_core::{Plan, TreeResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Thread-safe memo of plans keyed by `(leaf_count, capacity)`.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: Mutex<HashMap<(usize, usize), Arc<Plan>>>,
}

impl PlanCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached plan for `(leaf_count, capacity)`, planning it on
    /// first use.
    pub fn get_or_plan(&self, leaf_count: usize, capacity: usize) -> TreeResult<Arc<Plan>> {
        let key = (leaf_count, capacity);
        if let Some(p) = self.lock().get(&key) {
            return Ok(Arc::clone(p));
        }

        // Plan outside the lock; a concurrent miss on the same key builds an
        // identical plan and the first insert wins.
        debug!(leaf_count, capacity, "plan cache miss");
        let fresh = Arc::new(plan(leaf_count, capacity)?);
        let mut guard = self.lock();
        let entry = guard.entry(key).or_insert(fresh);
        Ok(Arc::clone(entry))
    }

    /// Number of cached shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all cached plans.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(usize, usize), Arc<Plan>>> {
        // Entries are immutable Arcs, so a poisoned map is still consistent.
        self.plans.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpmerkle_core::TreeError;

    #[test]
    fn second_lookup_shares_the_plan() {
        let cache = PlanCache::new();
        let a = cache.get_or_plan(1024, 16).unwrap();
        let b = cache.get_or_plan(1024, 16).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let _ = cache.get_or_plan(64, 16).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = PlanCache::new();
        assert_eq!(
            cache.get_or_plan(20, 15).unwrap_err(),
            TreeError::UnalignedChunk {
                layer: 0,
                offset: 15,
                len: 5
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(PlanCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&cache);
                std::thread::spawn(move || c.get_or_plan(256, 4).unwrap().unit_count())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 64 + 16 + 4);
        }
        assert_eq!(cache.len(), 1);
    }
}
