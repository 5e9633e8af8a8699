//! Shared fixtures for the coordination primitive tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use kudos_core::config::cache::MemoryCacheConfig;
use kudos_core::error::AppError;
use kudos_core::result::AppResult;
use kudos_core::traits::cache::CacheProvider;

use crate::memory::MemoryCacheProvider;
use crate::provider::CacheManager;

/// A cache manager over a fresh in-memory provider.
pub(crate) fn memory_cache() -> Arc<CacheManager> {
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 }, 60);
    Arc::new(CacheManager::from_provider(Arc::new(provider)))
}

/// A cache manager whose backend rejects every operation, for testing
/// fail-open behavior.
pub(crate) fn failing_cache() -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(FailingCacheProvider)))
}

/// Cache provider that simulates a down backend.
#[derive(Debug)]
struct FailingCacheProvider;

impl FailingCacheProvider {
    fn down() -> AppError {
        AppError::cache("backend unavailable")
    }
}

#[async_trait]
impl CacheProvider for FailingCacheProvider {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(Self::down())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(Self::down())
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(Self::down())
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(Self::down())
    }

    async fn set_nx(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        Err(Self::down())
    }

    async fn compare_and_delete(&self, _key: &str, _expected: &str) -> AppResult<bool> {
        Err(Self::down())
    }

    async fn incr(&self, _key: &str) -> AppResult<i64> {
        Err(Self::down())
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        Err(Self::down())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Err(Self::down())
    }
}
