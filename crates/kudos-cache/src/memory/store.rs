//! In-memory cache implementation using the moka crate.
//!
//! Entries carry their own TTL so that lock leases, view-dedup windows,
//! and cached entities can expire independently within one cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use kudos_core::config::cache::MemoryCacheConfig;
use kudos_core::result::AppResult;
use kudos_core::traits::cache::CacheProvider;

/// A cached value together with its per-entry TTL.
#[derive(Debug, Clone)]
struct StoredEntry {
    /// The cached string value.
    value: String,
    /// How long this entry lives from insert/update.
    ttl: Duration,
}

/// Expiry policy that reads the TTL off each entry.
struct PerEntryTtl;

impl Expiry<String, StoredEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, StoredEntry>,
    /// Default TTL for counter entries.
    default_ttl: Duration,
    /// Counters stored separately for atomic incr.
    counters: Arc<dashmap::DashMap<String, AtomicI64>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
            counters: Arc::new(dashmap::DashMap::new()),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                StoredEntry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.counters.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert(StoredEntry {
                value: value.to_string(),
                ttl,
            })
            .await;
        Ok(entry.is_fresh())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        // Get-compare-remove is not one atomic step like the Redis Lua
        // variant, which is acceptable for single-node in-memory use.
        match self.cache.get(key).await {
            Some(entry) if entry.value == expected => {
                self.cache.remove(key).await;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let entry = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicI64::new(0));
        let new_val = entry.value().fetch_add(1, Ordering::SeqCst) + 1;
        // Also store in cache for get() visibility.
        self.cache
            .insert(
                key.to_string(),
                StoredEntry {
                    value: new_val.to_string(),
                    ttl: self.default_ttl,
                },
            )
            .await;
        Ok(new_val)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        // Re-insert with the new TTL; the expiry policy picks it up.
        if let Some(entry) = self.cache.get(key).await {
            self.cache
                .insert(
                    key.to_string(),
                    StoredEntry {
                        value: entry.value,
                        ttl,
                    },
                )
                .await;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        let config = MemoryCacheConfig { max_capacity: 1000 };
        MemoryCacheProvider::new(&config, 60)
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        let val = provider.get("key2").await.unwrap();
        assert_eq!(val, None);
    }

    #[tokio::test]
    async fn test_per_entry_ttl_expires() {
        let provider = make_provider();
        provider
            .set("short", "v", Duration::from_millis(50))
            .await
            .unwrap();
        provider
            .set("long", "v", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(provider.get("short").await.unwrap(), None);
        assert_eq!(provider.get("long").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_set_nx() {
        let provider = make_provider();
        let first = provider
            .set_nx("nx_key", "val", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(first);
        let second = provider
            .set_nx("nx_key", "val2", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!second);
        // The original value survives the losing set_nx.
        assert_eq!(provider.get("nx_key").await.unwrap(), Some("val".to_string()));
    }

    #[tokio::test]
    async fn test_compare_and_delete() {
        let provider = make_provider();
        provider
            .set("cad", "token-a", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(!provider.compare_and_delete("cad", "token-b").await.unwrap());
        assert_eq!(provider.get("cad").await.unwrap(), Some("token-a".to_string()));

        assert!(provider.compare_and_delete("cad", "token-a").await.unwrap());
        assert_eq!(provider.get("cad").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr() {
        let provider = make_provider();
        assert_eq!(provider.incr("counter").await.unwrap(), 1);
        assert_eq!(provider.incr("counter").await.unwrap(), 2);
        assert_eq!(provider.get("counter").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let provider = make_provider();
        let data = serde_json::json!({"name": "test", "count": 42});
        provider
            .set_json("json_key", &data, Duration::from_secs(60))
            .await
            .unwrap();
        let result: Option<serde_json::Value> = provider.get_json("json_key").await.unwrap();
        assert_eq!(result, Some(data));
    }
}
