//! # kudos-cache
//!
//! Cache providers and the cross-request coordination primitives for
//! Kudos Cards:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! plus [`DistributedLock`], [`CircuitBreaker`], [`CacheCoordinator`]
//! (cache-aside with stampede prevention), and [`ViewDedupGuard`], all of
//! which run against whichever provider is configured and degrade to
//! "more work, not less correctness" when the backend is unavailable.

pub mod breaker;
pub mod coordinator;
pub mod keys;
pub mod lock;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod tracking;

#[cfg(test)]
pub(crate) mod test_support;

pub use breaker::{CircuitBreaker, CircuitState};
pub use coordinator::CacheCoordinator;
pub use lock::{DistributedLock, LockAttempt};
pub use provider::CacheManager;
pub use tracking::ViewDedupGuard;
