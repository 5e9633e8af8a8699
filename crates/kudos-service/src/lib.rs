//! # kudos-service
//!
//! The coordination services of Kudos Cards: card generation with
//! idempotency, quotas, and circuit-broken source fetching; cached read
//! paths; fire-and-forget view counting; share recording with signup
//! attribution; and cache-aside engagement metrics.

pub mod card;
pub mod context;
pub mod metrics;
pub mod share;
pub mod traits;

pub use context::RequestContext;
