//! Aggregate engagement metrics value objects.

pub mod model;

pub use model::{EngagementMetrics, KindCount, PlatformCount};
