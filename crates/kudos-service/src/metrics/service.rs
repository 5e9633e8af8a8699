//! Cache-aside aggregation of per-owner engagement metrics.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use kudos_cache::{keys, CacheCoordinator};
use kudos_core::config::generation::GenerationConfig;
use kudos_core::result::AppResult;
use kudos_database::repositories::MetricsRepository;
use kudos_entity::metrics::EngagementMetrics;

/// Derives viral/engagement statistics from persisted cards and shares.
///
/// Every grouped count is computed at the storage layer; this service
/// only assembles the result and caches it through the stampede-safe
/// coordinator.
#[derive(Debug, Clone)]
pub struct MetricsService {
    /// Grouped aggregation queries.
    repo: Arc<MetricsRepository>,
    /// Stampede-safe cache-aside coordinator.
    coordinator: CacheCoordinator,
    /// TTL for cached metrics.
    ttl: Duration,
}

impl MetricsService {
    /// Create a new metrics service.
    pub fn new(
        repo: Arc<MetricsRepository>,
        coordinator: CacheCoordinator,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            repo,
            coordinator,
            ttl: Duration::from_secs(config.metrics_cache_ttl_seconds),
        }
    }

    /// Aggregate engagement metrics for one owner.
    pub async fn engagement_metrics(&self, owner_id: Uuid) -> AppResult<EngagementMetrics> {
        let repo = Arc::clone(&self.repo);
        self.coordinator
            .get_or_load(
                &keys::owner_metrics(owner_id),
                &keys::owner_metrics_lock(owner_id),
                self.ttl,
                || async move { load_metrics(&repo, owner_id).await },
            )
            .await
    }

    /// Drop the cached metrics for an owner, e.g. after bulk changes.
    pub async fn invalidate(&self, owner_id: Uuid) {
        self.coordinator
            .invalidate(&keys::owner_metrics(owner_id))
            .await;
    }
}

/// Run the grouped queries and assemble the metrics with their ratios.
async fn load_metrics(
    repo: &MetricsRepository,
    owner_id: Uuid,
) -> AppResult<EngagementMetrics> {
    let (total_cards, total_views) = repo.card_totals(owner_id).await?;
    let cards_by_kind = repo.cards_by_kind(owner_id).await?;
    let shares_by_platform = repo.shares_by_platform(owner_id).await?;
    let shares_by_kind = repo.shares_by_kind(owner_id).await?;
    let attributed_signups = repo.attributed_signups(owner_id).await?;

    let total_shares = shares_by_platform.iter().map(|p| p.count).sum();

    Ok(EngagementMetrics {
        total_cards,
        cards_by_kind,
        total_views,
        total_shares,
        shares_by_platform,
        shares_by_kind,
        attributed_signups,
        viral_coefficient: 0.0,
        share_conversion_rate: 0.0,
        avg_views_per_card: 0.0,
    }
    .with_ratios())
}
