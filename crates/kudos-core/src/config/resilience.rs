//! Coordination primitive configuration: locks, circuit breakers, stampede
//! control.

use serde::{Deserialize, Serialize};

/// Settings for the cross-request coordination primitives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Distributed lock settings.
    #[serde(default)]
    pub lock: LockConfig,
    /// Circuit breaker settings.
    #[serde(default)]
    pub breaker: CircuitBreakerConfig,
    /// Stampede-prevention poll settings.
    #[serde(default)]
    pub stampede: StampedeConfig,
}

/// Distributed lock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Lock TTL in milliseconds. Locks auto-expire after this even if the
    /// holder crashes.
    #[serde(default = "default_lock_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_lock_ttl_ms(),
        }
    }
}

/// Circuit breaker settings, shared by all dependency keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before allowing a probe.
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_seconds: u64,
    /// TTL for persisted breaker state entries in seconds. Evicted
    /// entries default back to closed on the next read.
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            reset_timeout_seconds: default_reset_timeout(),
            state_ttl_seconds: default_state_ttl(),
        }
    }
}

/// Bounded cache-poll settings for callers that lost the refresh lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampedeConfig {
    /// Maximum number of cache polls while waiting for the lock holder.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for StampedeConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_lock_ttl_ms() -> u64 {
    5000
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_reset_timeout() -> u64 {
    30
}

fn default_state_ttl() -> u64 {
    300
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    50
}
