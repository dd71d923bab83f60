//! Process-wide cache of extracted criteria, injected into the coordinator.

use crate::models::CriteriaSet;
use dashmap::DashMap;
use std::sync::Arc;

/// Lookup of previously extracted criteria by candidate id
///
/// A miss simply falls through to extraction, so any implementation
/// (including one that never stores anything) is correct.
pub trait CriteriaCache: Send + Sync {
    fn get(&self, candidate_id: &str) -> Option<CriteriaSet>;

    fn set(&self, candidate_id: &str, criteria: CriteriaSet);
}

/// Never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCriteriaCache;

impl CriteriaCache for NoopCriteriaCache {
    fn get(&self, _candidate_id: &str) -> Option<CriteriaSet> {
        None
    }

    fn set(&self, _candidate_id: &str, _criteria: CriteriaSet) {}
}

/// Unbounded in-memory cache shared across runs; no eviction
#[derive(Debug, Clone, Default)]
pub struct InMemoryCriteriaCache {
    entries: Arc<DashMap<String, CriteriaSet>>,
}

impl InMemoryCriteriaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, candidate_id: &str) -> bool {
        self.entries.contains_key(candidate_id)
    }
}

impl CriteriaCache for InMemoryCriteriaCache {
    fn get(&self, candidate_id: &str) -> Option<CriteriaSet> {
        self.entries
            .get(candidate_id)
            .map(|entry| entry.value().clone())
    }

    /// First write wins; later writes for the same id are ignored
    fn set(&self, candidate_id: &str, criteria: CriteriaSet) {
        self.entries
            .entry(candidate_id.to_string())
            .or_insert(criteria);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CriterionCategory;

    #[test]
    fn test_noop_cache_never_hits() {
        let cache = NoopCriteriaCache;
        cache.set("NCT01", CriteriaSet::new("NCT01"));
        assert!(cache.get("NCT01").is_none());
    }

    #[test]
    fn test_in_memory_cache_first_write_wins() {
        let cache = InMemoryCriteriaCache::new();
        assert!(cache.is_empty());

        let first = CriteriaSet::new("NCT01").include("Melanoma", CriterionCategory::Diagnosis);
        cache.set("NCT01", first.clone());
        cache.set("NCT01", CriteriaSet::new("NCT01"));

        assert_eq!(cache.get("NCT01"), Some(first));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("NCT02").is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = InMemoryCriteriaCache::new();
        let shared = cache.clone();
        shared.set("NCT09", CriteriaSet::new("NCT09"));
        assert!(cache.contains("NCT09"));
    }
}
