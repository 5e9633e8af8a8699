//! Public view counting configuration.

use serde::{Deserialize, Serialize};

/// Settings for public view deduplication and milestone events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Window during which repeat views from the same client are not
    /// counted, in seconds.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_seconds: u64,
    /// View counts that fire a milestone event when reached exactly.
    #[serde(default = "default_milestones")]
    pub milestones: Vec<i64>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            dedup_window_seconds: default_dedup_window(),
            milestones: default_milestones(),
        }
    }
}

fn default_dedup_window() -> u64 {
    3600
}

fn default_milestones() -> Vec<i64> {
    vec![100, 500, 1000]
}
