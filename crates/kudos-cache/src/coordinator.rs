//! Cache-aside read path with stampede prevention.
//!
//! On a miss, exactly one caller takes the refresh lock and queries the
//! source of truth; everyone else polls the cache for the repopulated
//! value a bounded number of times before falling back to the loader.
//! Losing the lock or the cache therefore costs extra work, never
//! correctness.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use kudos_core::config::resilience::{LockConfig, StampedeConfig};
use kudos_core::metrics::{MetricsRegistry, counters};
use kudos_core::result::AppResult;
use kudos_core::traits::cache::CacheProvider;

use crate::lock::DistributedLock;
use crate::provider::CacheManager;

/// Cache-aside coordinator shared by card, share-page, and metrics reads.
#[derive(Debug, Clone)]
pub struct CacheCoordinator {
    /// Shared cache store.
    cache: Arc<CacheManager>,
    /// Refresh lock primitive.
    lock: DistributedLock,
    /// Lease duration for refresh locks.
    lock_ttl: Duration,
    /// Bounded poll settings for lock losers.
    poll_attempts: u32,
    poll_interval: Duration,
    /// Hit/miss counters.
    metrics: Arc<MetricsRegistry>,
}

impl CacheCoordinator {
    /// Create a new coordinator over the given store.
    pub fn new(
        cache: Arc<CacheManager>,
        metrics: Arc<MetricsRegistry>,
        lock_config: &LockConfig,
        stampede_config: &StampedeConfig,
    ) -> Self {
        let lock = DistributedLock::new(Arc::clone(&cache));
        Self {
            cache,
            lock,
            lock_ttl: Duration::from_millis(lock_config.ttl_ms),
            poll_attempts: stampede_config.poll_attempts,
            poll_interval: Duration::from_millis(stampede_config.poll_interval_ms),
            metrics,
        }
    }

    /// Read `cache_key`, or load it from the source of truth and
    /// repopulate the cache under `lock_key`.
    ///
    /// Domain errors from the loader (not-found, expired) propagate to
    /// the caller; the refresh lock is released regardless of outcome.
    /// Cache read/write failures are logged and treated as misses.
    pub async fn get_or_load<T, F, Fut>(
        &self,
        cache_key: &str,
        lock_key: &str,
        ttl: Duration,
        loader: F,
    ) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        match self.cache.get_json::<T>(cache_key).await {
            Ok(Some(value)) => {
                self.metrics.incr(counters::CACHE_HIT);
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(cache_key, error = %e, "Cache read failed, treating as miss");
            }
        }
        self.metrics.incr(counters::CACHE_MISS);

        let attempt = self.lock.acquire(lock_key, self.lock_ttl).await;
        if attempt.acquired {
            let result = loader().await;
            if let Ok(value) = &result {
                if let Err(e) = self.cache.set_json(cache_key, value, ttl).await {
                    warn!(cache_key, error = %e, "Cache repopulation failed");
                }
            }
            // Release even when the loader failed.
            self.lock.release(lock_key, &attempt.token).await;
            return result;
        }

        // Someone else is refreshing: wait for their value to appear.
        for _ in 0..self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            if let Ok(Some(value)) = self.cache.get_json::<T>(cache_key).await {
                return Ok(value);
            }
        }

        // The lock holder crashed or is slow. Never block indefinitely.
        debug!(cache_key, "Refresh lock holder did not repopulate, loading directly");
        loader().await
    }

    /// Drop a cache entry, e.g. after a mutation. Failures are logged.
    pub async fn invalidate(&self, cache_key: &str) {
        if let Err(e) = self.cache.delete(cache_key).await {
            warn!(cache_key, error = %e, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use kudos_core::AppError;

    use super::*;
    use crate::test_support::{failing_cache, memory_cache};

    fn coordinator(cache: Arc<CacheManager>) -> CacheCoordinator {
        CacheCoordinator::new(
            cache,
            Arc::new(MetricsRegistry::new()),
            &LockConfig { ttl_ms: 5000 },
            &StampedeConfig {
                poll_attempts: 20,
                poll_interval_ms: 20,
            },
        )
    }

    #[tokio::test]
    async fn test_hit_skips_loader() {
        let cache = memory_cache();
        let coordinator = coordinator(Arc::clone(&cache));

        cache
            .set_json("k", &"cached".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let loads = AtomicU32::new(0);
        let value: String = coordinator
            .get_or_load("k", "k:lock", Duration::from_secs(60), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok("fresh".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "cached");
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_loads_and_repopulates() {
        let cache = memory_cache();
        let coordinator = coordinator(Arc::clone(&cache));

        let value: String = coordinator
            .get_or_load("k", "k:lock", Duration::from_secs(60), || async {
                Ok("fresh".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "fresh");

        let cached: Option<String> = cache.get_json("k").await.unwrap();
        assert_eq!(cached, Some("fresh".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_run_loader_once() {
        let cache = memory_cache();
        let coordinator = Arc::new(coordinator(Arc::clone(&cache)));
        let loads = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coordinator = Arc::clone(&coordinator);
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                coordinator
                    .get_or_load("hot", "hot:lock", Duration::from_secs(60), move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok("value".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            let value: String = handle.await.unwrap().unwrap();
            assert_eq!(value, "value");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_loader_error_propagates_and_releases_lock() {
        let cache = memory_cache();
        let coordinator = coordinator(Arc::clone(&cache));

        let result: AppResult<String> = coordinator
            .get_or_load("gone", "gone:lock", Duration::from_secs(60), || async {
                Err(AppError::not_found("card not found"))
            })
            .await;
        assert!(result.is_err());

        // The lock was released in the finally-equivalent: a second call
        // can acquire it immediately and succeed.
        let value: String = coordinator
            .get_or_load("gone", "gone:lock", Duration::from_secs(60), || async {
                Ok("recovered".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "recovered");
    }

    #[tokio::test]
    async fn test_falls_through_when_holder_never_repopulates() {
        let cache = memory_cache();
        let lock = DistributedLock::new(Arc::clone(&cache));

        // Simulate a crashed refresher holding the lock.
        let held = lock.acquire("stuck:lock", Duration::from_secs(30)).await;
        assert!(held.acquired);

        let coordinator = CacheCoordinator::new(
            Arc::clone(&cache),
            Arc::new(MetricsRegistry::new()),
            &LockConfig { ttl_ms: 5000 },
            &StampedeConfig {
                poll_attempts: 2,
                poll_interval_ms: 10,
            },
        );

        let value: String = coordinator
            .get_or_load("stuck", "stuck:lock", Duration::from_secs(60), || async {
                Ok("direct".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "direct");
    }

    #[tokio::test]
    async fn test_cache_down_degrades_to_direct_load() {
        let coordinator = coordinator(failing_cache());

        let value: String = coordinator
            .get_or_load("k", "k:lock", Duration::from_secs(60), || async {
                Ok("loaded".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "loaded");
    }
}
