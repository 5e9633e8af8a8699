//! In-process operational counters.
//!
//! Thread-safe via a concurrent map of atomics. Counters cover generation
//! outcomes by kind, shares by platform, cache hits/misses, and view
//! counting, and are exported as a consistent snapshot on demand without
//! blocking writers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Well-known counter names.
pub mod counters {
    /// Cards generated successfully; suffixed with the kind.
    pub const CARDS_GENERATED: &str = "cards.generated";
    /// Card generation failures; suffixed with the kind.
    pub const CARDS_GENERATION_FAILED: &str = "cards.generation_failed";
    /// Cache-aside read hits.
    pub const CACHE_HIT: &str = "cache.hit";
    /// Cache-aside read misses.
    pub const CACHE_MISS: &str = "cache.miss";
    /// Public views that were counted.
    pub const VIEWS_COUNTED: &str = "views.counted";
    /// Public views blocked as duplicates.
    pub const VIEWS_DEDUPLICATED: &str = "views.deduplicated";
    /// Shares recorded; suffixed with the platform.
    pub const SHARES_RECORDED: &str = "shares.recorded";
}

/// Registry of named monotonic counters.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Counter cells keyed by metric name.
    cells: DashMap<String, AtomicU64>,
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter by 1.
    pub fn incr(&self, name: &str) {
        self.incr_by(name, 1);
    }

    /// Increment a counter by an arbitrary amount.
    pub fn incr_by(&self, name: &str, amount: u64) {
        if let Some(cell) = self.cells.get(name) {
            cell.fetch_add(amount, Ordering::Relaxed);
            return;
        }
        self.cells
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    /// Increment a labeled counter, e.g. `cards.generated.goal_achieved`.
    pub fn incr_labeled(&self, name: &str, label: &str) {
        self.incr(&format!("{name}.{label}"));
    }

    /// Current value of a counter, 0 if it was never incremented.
    pub fn value(&self, name: &str) -> u64 {
        self.cells
            .get(name)
            .map(|cell| cell.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Export all counters as a sorted snapshot.
    ///
    /// The snapshot is consistent per counter, not across counters:
    /// writers are never blocked.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.cells
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incr_and_value() {
        let registry = MetricsRegistry::new();
        registry.incr(counters::CACHE_HIT);
        registry.incr(counters::CACHE_HIT);
        registry.incr_by(counters::CACHE_MISS, 3);

        assert_eq!(registry.value(counters::CACHE_HIT), 2);
        assert_eq!(registry.value(counters::CACHE_MISS), 3);
        assert_eq!(registry.value("never.touched"), 0);
    }

    #[test]
    fn test_labeled_counter() {
        let registry = MetricsRegistry::new();
        registry.incr_labeled(counters::CARDS_GENERATED, "goal_achieved");
        assert_eq!(registry.value("cards.generated.goal_achieved"), 1);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let registry = MetricsRegistry::new();
        registry.incr("b.counter");
        registry.incr("a.counter");

        let snapshot = registry.snapshot();
        let names: Vec<&String> = snapshot.keys().collect();
        assert_eq!(names, vec!["a.counter", "b.counter"]);
    }

    #[test]
    fn test_concurrent_increments() {
        use std::sync::Arc;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    registry.incr(counters::VIEWS_COUNTED);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.value(counters::VIEWS_COUNTED), 8000);
    }
}
