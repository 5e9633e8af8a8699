//! Circuit breaker with state persisted in the shared cache store.
//!
//! One JSON entry per dependency key, re-derived with a default on every
//! read. Store failures never block the guarded call: a breaker that
//! cannot load its state behaves as if it were closed (fail open).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use kudos_core::config::resilience::CircuitBreakerConfig;
use kudos_core::result::AppResult;
use kudos_core::traits::cache::CacheProvider;
use kudos_core::AppError;

use crate::keys;
use crate::provider::CacheManager;

/// Circuit breaker states representing the current operational mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation: all calls are allowed through.
    #[default]
    Closed,
    /// Failure mode: calls fail fast without executing.
    Open,
    /// Testing recovery: the probe call is allowed through.
    HalfOpen,
}

/// Persisted per-dependency breaker state.
///
/// Kept small and immutable in use: load, copy-modify, store. A missing
/// or corrupt entry always deserializes back to the closed default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BreakerState {
    /// Current circuit state.
    state: CircuitState,
    /// Consecutive failure count.
    failure_count: u32,
    /// When the last failure was recorded.
    last_failure_at: Option<DateTime<Utc>>,
    /// When the circuit was opened.
    opened_at: Option<DateTime<Utc>>,
}

/// Per-dependency-key failure tracker backed by the shared cache store.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    /// Shared cache store.
    cache: Arc<CacheManager>,
    /// Breaker thresholds and timeouts.
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker over the given store.
    pub fn new(cache: Arc<CacheManager>, config: CircuitBreakerConfig) -> Self {
        Self { cache, config }
    }

    /// Check whether a call to `dependency` is currently allowed.
    ///
    /// Fails with a circuit-open error carrying a retry-after hint while
    /// the circuit is open and the reset timeout has not elapsed. An open
    /// circuit whose timeout has elapsed transitions to half-open and
    /// lets the call through as the probe.
    pub async fn check_allowed(&self, dependency: &str) -> AppResult<()> {
        let mut state = self.load_state(dependency).await;

        match state.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => {
                let Some(opened_at) = state.opened_at else {
                    // Open without a timestamp should not happen; allow
                    // the call rather than blocking forever.
                    warn!(dependency, "Circuit open but no opened_at recorded, allowing call");
                    return Ok(());
                };

                let reset_timeout = Duration::from_secs(self.config.reset_timeout_seconds);
                let elapsed = (Utc::now() - opened_at).to_std().unwrap_or_default();

                if elapsed >= reset_timeout {
                    state.state = CircuitState::HalfOpen;
                    self.store_state(dependency, &state).await;
                    info!(dependency, "Circuit half-open, allowing probe");
                    Ok(())
                } else {
                    let retry_after = reset_timeout - elapsed;
                    Err(AppError::circuit_open(dependency, retry_after))
                }
            }
        }
    }

    /// Record a successful call to `dependency`.
    pub async fn record_success(&self, dependency: &str) {
        let state = self.load_state(dependency).await;

        match state.state {
            CircuitState::HalfOpen => {
                // Probe succeeded: back to a fresh closed state.
                self.store_state(dependency, &BreakerState::default()).await;
                info!(dependency, "Circuit closed (recovered)");
            }
            CircuitState::Closed if state.failure_count > 0 => {
                // Only write when there is something to reset.
                self.store_state(dependency, &BreakerState::default()).await;
            }
            CircuitState::Closed => {}
            CircuitState::Open => {
                debug!(dependency, "Success recorded while circuit is open, ignoring");
            }
        }
    }

    /// Record a failed call to `dependency`.
    pub async fn record_failure(&self, dependency: &str) {
        let mut state = self.load_state(dependency).await;
        state.failure_count += 1;
        state.last_failure_at = Some(Utc::now());

        match state.state {
            CircuitState::HalfOpen => {
                // Probe failed: reopen, keep accumulating failures.
                state.state = CircuitState::Open;
                state.opened_at = Some(Utc::now());
                error!(
                    dependency,
                    failure_count = state.failure_count,
                    "Circuit reopened (probe failed)"
                );
            }
            CircuitState::Closed if state.failure_count >= self.config.failure_threshold => {
                state.state = CircuitState::Open;
                state.opened_at = Some(Utc::now());
                error!(
                    dependency,
                    failure_count = state.failure_count,
                    failure_threshold = self.config.failure_threshold,
                    "Circuit opened (failing fast)"
                );
            }
            CircuitState::Closed | CircuitState::Open => {}
        }

        self.store_state(dependency, &state).await;
    }

    /// Current state of a dependency's circuit, for health reporting.
    pub async fn state(&self, dependency: &str) -> CircuitState {
        self.load_state(dependency).await.state
    }

    /// Load the persisted state, defaulting to closed when the entry is
    /// missing, evicted, corrupt, or the store is down.
    async fn load_state(&self, dependency: &str) -> BreakerState {
        let key = keys::breaker_state(dependency);
        match self.cache.get_json::<BreakerState>(&key).await {
            Ok(Some(state)) => state,
            Ok(None) => BreakerState::default(),
            Err(e) => {
                warn!(dependency, error = %e, "Breaker state unavailable, failing open");
                BreakerState::default()
            }
        }
    }

    /// Persist the state with the configured TTL. Failures are logged,
    /// never raised.
    async fn store_state(&self, dependency: &str, state: &BreakerState) {
        let key = keys::breaker_state(dependency);
        let ttl = Duration::from_secs(self.config.state_ttl_seconds);
        if let Err(e) = self.cache.set_json(&key, state, ttl).await {
            warn!(dependency, error = %e, "Failed to persist breaker state");
        }
    }
}

#[cfg(test)]
mod tests {
    use kudos_core::ErrorKind;

    use super::*;
    use crate::test_support::{failing_cache, memory_cache};

    fn breaker(cache: Arc<CacheManager>, threshold: u32, reset_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(
            cache,
            CircuitBreakerConfig {
                failure_threshold: threshold,
                reset_timeout_seconds: reset_secs,
                state_ttl_seconds: 300,
            },
        )
    }

    #[tokio::test]
    async fn test_opens_after_threshold_failures() {
        let breaker = breaker(memory_cache(), 3, 30);

        breaker.record_failure("upstream").await;
        breaker.record_failure("upstream").await;
        assert_eq!(breaker.state("upstream").await, CircuitState::Closed);
        assert!(breaker.check_allowed("upstream").await.is_ok());

        breaker.record_failure("upstream").await;
        assert_eq!(breaker.state("upstream").await, CircuitState::Open);

        let err = breaker.check_allowed("upstream").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircuitOpen);
        assert!(err.retry_after.is_some());
    }

    #[tokio::test]
    async fn test_success_resets_consecutive_failures() {
        let breaker = breaker(memory_cache(), 3, 30);

        breaker.record_failure("upstream").await;
        breaker.record_failure("upstream").await;
        breaker.record_success("upstream").await;

        // The streak restarts: two more failures stay closed.
        breaker.record_failure("upstream").await;
        breaker.record_failure("upstream").await;
        assert_eq!(breaker.state("upstream").await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_probe_success_closes_circuit() {
        let breaker = breaker(memory_cache(), 1, 0);

        breaker.record_failure("upstream").await;
        assert_eq!(breaker.state("upstream").await, CircuitState::Open);

        // Reset timeout of 0s: the next check transitions to half-open.
        assert!(breaker.check_allowed("upstream").await.is_ok());
        assert_eq!(breaker.state("upstream").await, CircuitState::HalfOpen);

        breaker.record_success("upstream").await;
        assert_eq!(breaker.state("upstream").await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_probe_failure_reopens_circuit() {
        let breaker = breaker(memory_cache(), 1, 0);

        breaker.record_failure("upstream").await;
        assert!(breaker.check_allowed("upstream").await.is_ok());
        assert_eq!(breaker.state("upstream").await, CircuitState::HalfOpen);

        breaker.record_failure("upstream").await;
        assert_eq!(breaker.state("upstream").await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_open_circuit_rejects_until_timeout() {
        let breaker = breaker(memory_cache(), 1, 3600);

        breaker.record_failure("upstream").await;
        let err = breaker.check_allowed("upstream").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircuitOpen);
        assert!(err.retry_after.unwrap() <= Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_dependencies_are_isolated() {
        let breaker = breaker(memory_cache(), 1, 3600);

        breaker.record_failure("failing").await;
        assert_eq!(breaker.state("failing").await, CircuitState::Open);
        assert!(breaker.check_allowed("healthy").await.is_ok());
    }

    #[tokio::test]
    async fn test_fails_open_when_store_is_down() {
        let breaker = breaker(failing_cache(), 1, 3600);

        // Failures cannot be persisted, so the circuit can never block.
        breaker.record_failure("upstream").await;
        breaker.record_failure("upstream").await;
        assert!(breaker.check_allowed("upstream").await.is_ok());
    }
}
