//! Distributed lock over the shared cache store.
//!
//! A lock is a single TTL-bound entry whose value is a random token. Only
//! the holder of the matching token may release it; anyone else's entry
//! simply expires. When the store is unreachable, acquisition fails open:
//! the caller proceeds without stampede protection rather than being
//! refused service.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use kudos_core::traits::cache::CacheProvider;

use crate::provider::CacheManager;

/// Outcome of a lock acquisition attempt.
#[derive(Debug, Clone)]
pub struct LockAttempt {
    /// Whether the caller holds the lock (or the store was down and we
    /// failed open).
    pub acquired: bool,
    /// The token guarding release. Only meaningful when `acquired`.
    pub token: String,
}

/// Named, token-guarded, TTL-bound mutex over the shared cache store.
#[derive(Debug, Clone)]
pub struct DistributedLock {
    /// Shared cache store.
    cache: Arc<CacheManager>,
}

impl DistributedLock {
    /// Create a new lock primitive over the given store.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Try to acquire the named lock for `ttl`.
    ///
    /// Atomic set-if-absent. Never blocks waiting for the lock; the
    /// caller decides how to react to a lost race.
    pub async fn acquire(&self, name: &str, ttl: Duration) -> LockAttempt {
        let token = Uuid::new_v4().to_string();
        match self.cache.set_nx(name, &token, ttl).await {
            Ok(true) => {
                debug!(lock = name, "Lock acquired");
                LockAttempt {
                    acquired: true,
                    token,
                }
            }
            Ok(false) => LockAttempt {
                acquired: false,
                token,
            },
            Err(e) => {
                // Fail open: no stampede protection beats refusing service.
                warn!(lock = name, error = %e, "Lock store unavailable, proceeding without lock");
                LockAttempt {
                    acquired: true,
                    token,
                }
            }
        }
    }

    /// Release the named lock if `token` still guards it.
    ///
    /// A holder whose TTL already expired must not delete a successor's
    /// entry, hence the token comparison. Failures are logged, never
    /// raised.
    pub async fn release(&self, name: &str, token: &str) {
        match self.cache.compare_and_delete(name, token).await {
            Ok(true) => debug!(lock = name, "Lock released"),
            Ok(false) => debug!(lock = name, "Lock was no longer held by this token"),
            Err(e) => warn!(lock = name, error = %e, "Lock release failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failing_cache, memory_cache};

    #[tokio::test]
    async fn test_acquire_is_exclusive() {
        let lock = DistributedLock::new(memory_cache());

        let first = lock.acquire("jobs:refresh", Duration::from_secs(5)).await;
        assert!(first.acquired);

        let second = lock.acquire("jobs:refresh", Duration::from_secs(5)).await;
        assert!(!second.acquired);
    }

    #[tokio::test]
    async fn test_release_requires_matching_token() {
        let cache = memory_cache();
        let lock = DistributedLock::new(Arc::clone(&cache));

        let held = lock.acquire("guarded", Duration::from_secs(5)).await;
        assert!(held.acquired);

        // A foreign token must not free the lock.
        lock.release("guarded", "someone-elses-token").await;
        let retry = lock.acquire("guarded", Duration::from_secs(5)).await;
        assert!(!retry.acquired);

        // The owner's token does.
        lock.release("guarded", &held.token).await;
        let after = lock.acquire("guarded", Duration::from_secs(5)).await;
        assert!(after.acquired);
    }

    #[tokio::test]
    async fn test_lock_expires_on_its_own() {
        let lock = DistributedLock::new(memory_cache());

        let held = lock.acquire("short", Duration::from_millis(50)).await;
        assert!(held.acquired);

        tokio::time::sleep(Duration::from_millis(80)).await;

        let after = lock.acquire("short", Duration::from_secs(5)).await;
        assert!(after.acquired);
    }

    #[tokio::test]
    async fn test_acquire_fails_open_when_store_is_down() {
        let lock = DistributedLock::new(failing_cache());

        let attempt = lock.acquire("anything", Duration::from_secs(5)).await;
        assert!(attempt.acquired);

        // Release against a dead store must not panic or error out.
        lock.release("anything", &attempt.token).await;
    }
}
