//! Per-(card, client) view deduplication window.
//!
//! One atomic set-if-absent of a TTL-bound tracking entry decides whether
//! a public view is counted. No client identifier, or an unreachable
//! store, always counts: completeness of the public counter is preferred
//! over exactness.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use kudos_core::config::views::ViewConfig;
use kudos_core::traits::cache::CacheProvider;

use crate::keys;
use crate::provider::CacheManager;

/// Guard deciding whether a public view should increment the counter.
#[derive(Debug, Clone)]
pub struct ViewDedupGuard {
    /// Shared cache store.
    cache: Arc<CacheManager>,
    /// Dedup window applied per (card, client) pair.
    window: Duration,
}

impl ViewDedupGuard {
    /// Create a new guard over the given store.
    pub fn new(cache: Arc<CacheManager>, config: &ViewConfig) -> Self {
        Self {
            cache,
            window: Duration::from_secs(config.dedup_window_seconds),
        }
    }

    /// Whether a view of `card_id` by `client_identifier` should count.
    ///
    /// Writing the tracking entry and checking for its presence is one
    /// atomic step, so two racing views from the same client cannot both
    /// count.
    pub async fn should_count(&self, card_id: Uuid, client_identifier: Option<&str>) -> bool {
        let Some(client) = client_identifier.filter(|c| !c.is_empty()) else {
            // No identifier to dedup on: count the view.
            return true;
        };

        let key = keys::view_dedup(card_id, client);
        let stamp = Utc::now().to_rfc3339();
        match self.cache.set_nx(&key, &stamp, self.window).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(%card_id, error = %e, "View tracking store unavailable, counting view");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failing_cache, memory_cache};

    fn guard(cache: Arc<CacheManager>, window_seconds: u64) -> ViewDedupGuard {
        ViewDedupGuard::new(
            cache,
            &ViewConfig {
                dedup_window_seconds: window_seconds,
                milestones: vec![100, 500, 1000],
            },
        )
    }

    #[tokio::test]
    async fn test_duplicate_view_blocked_within_window() {
        let guard = guard(memory_cache(), 3600);
        let card = Uuid::new_v4();

        assert!(guard.should_count(card, Some("203.0.113.9")).await);
        assert!(!guard.should_count(card, Some("203.0.113.9")).await);
    }

    #[tokio::test]
    async fn test_different_client_counts() {
        let guard = guard(memory_cache(), 3600);
        let card = Uuid::new_v4();

        assert!(guard.should_count(card, Some("203.0.113.9")).await);
        assert!(guard.should_count(card, Some("203.0.113.10")).await);
    }

    #[tokio::test]
    async fn test_different_card_counts() {
        let guard = guard(memory_cache(), 3600);

        assert!(guard.should_count(Uuid::new_v4(), Some("203.0.113.9")).await);
        assert!(guard.should_count(Uuid::new_v4(), Some("203.0.113.9")).await);
    }

    #[tokio::test]
    async fn test_missing_client_always_counts() {
        let guard = guard(memory_cache(), 3600);
        let card = Uuid::new_v4();

        assert!(guard.should_count(card, None).await);
        assert!(guard.should_count(card, None).await);
        assert!(guard.should_count(card, Some("")).await);
    }

    #[tokio::test]
    async fn test_counts_again_after_window() {
        let guard = ViewDedupGuard {
            cache: memory_cache(),
            window: Duration::from_millis(50),
        };
        let card = Uuid::new_v4();

        assert!(guard.should_count(card, Some("203.0.113.9")).await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(guard.should_count(card, Some("203.0.113.9")).await);
    }

    #[tokio::test]
    async fn test_store_failure_counts_view() {
        let guard = guard(failing_cache(), 3600);
        assert!(guard.should_count(Uuid::new_v4(), Some("203.0.113.9")).await);
    }
}
