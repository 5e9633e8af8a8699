//! Card generation configuration: quotas, short codes, timeouts, cache TTLs.

use serde::{Deserialize, Serialize};

/// Settings for the card generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Lifetime cap on cards per owner. Soft-deleted cards still count.
    #[serde(default = "default_max_total_cards")]
    pub max_total_cards: i64,
    /// Rolling 24-hour cap on cards per owner.
    #[serde(default = "default_max_daily_cards")]
    pub max_daily_cards: i64,
    /// Length of generated referral and share codes.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// Collision retry attempts inside the create transaction.
    #[serde(default = "default_code_max_retries")]
    pub code_max_retries: u32,
    /// Timeout for the source fetch call in seconds.
    #[serde(default = "default_source_timeout")]
    pub source_timeout_seconds: u64,
    /// Timeout for the create transaction in seconds.
    #[serde(default = "default_transaction_timeout")]
    pub transaction_timeout_seconds: u64,
    /// TTL for owner card-by-id cache entries in seconds.
    #[serde(default = "default_card_ttl")]
    pub card_cache_ttl_seconds: u64,
    /// TTL for public share-page cache entries in seconds.
    #[serde(default = "default_public_ttl")]
    pub public_cache_ttl_seconds: u64,
    /// TTL for aggregate metrics cache entries in seconds.
    #[serde(default = "default_metrics_ttl")]
    pub metrics_cache_ttl_seconds: u64,
    /// Days during which a referral can still be attributed to a signup.
    #[serde(default = "default_attribution_window")]
    pub attribution_window_days: i64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_total_cards: default_max_total_cards(),
            max_daily_cards: default_max_daily_cards(),
            code_length: default_code_length(),
            code_max_retries: default_code_max_retries(),
            source_timeout_seconds: default_source_timeout(),
            transaction_timeout_seconds: default_transaction_timeout(),
            card_cache_ttl_seconds: default_card_ttl(),
            public_cache_ttl_seconds: default_public_ttl(),
            metrics_cache_ttl_seconds: default_metrics_ttl(),
            attribution_window_days: default_attribution_window(),
        }
    }
}

fn default_max_total_cards() -> i64 {
    50
}

fn default_max_daily_cards() -> i64 {
    10
}

fn default_code_length() -> usize {
    8
}

fn default_code_max_retries() -> u32 {
    3
}

fn default_source_timeout() -> u64 {
    5
}

fn default_transaction_timeout() -> u64 {
    10
}

fn default_card_ttl() -> u64 {
    3600
}

fn default_public_ttl() -> u64 {
    300
}

fn default_metrics_ttl() -> u64 {
    120
}

fn default_attribution_window() -> i64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_total_cards, 50);
        assert_eq!(config.max_daily_cards, 10);
        assert_eq!(config.code_length, 8);
        assert_eq!(config.code_max_retries, 3);
    }
}
