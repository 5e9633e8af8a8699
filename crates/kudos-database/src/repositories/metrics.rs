//! Grouped aggregation queries for engagement metrics.
//!
//! All grouping happens at the storage layer. Loading raw rows into
//! memory to count them would be both an N+1 hazard and unbounded in
//! memory, so none of these queries return entity rows.

use sqlx::PgPool;
use uuid::Uuid;

use kudos_core::error::{AppError, ErrorKind};
use kudos_core::result::AppResult;
use kudos_entity::metrics::{KindCount, PlatformCount};

/// Repository for storage-side metric aggregation.
#[derive(Debug, Clone)]
pub struct MetricsRepository {
    pool: PgPool,
}

impl MetricsRepository {
    /// Create a new metrics repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active card count and summed view count for an owner.
    pub async fn card_totals(&self, owner_id: Uuid) -> AppResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(view_count), 0)::BIGINT \
             FROM cards WHERE owner_id = $1 AND is_active = TRUE",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to total cards", e))
    }

    /// Active cards grouped by kind.
    pub async fn cards_by_kind(&self, owner_id: Uuid) -> AppResult<Vec<KindCount>> {
        sqlx::query_as::<_, KindCount>(
            "SELECT kind, COUNT(*) AS count \
             FROM cards WHERE owner_id = $1 AND is_active = TRUE \
             GROUP BY kind ORDER BY count DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to group cards by kind", e))
    }

    /// Shares of an owner's cards grouped by platform.
    pub async fn shares_by_platform(&self, owner_id: Uuid) -> AppResult<Vec<PlatformCount>> {
        sqlx::query_as::<_, PlatformCount>(
            "SELECT s.platform, COUNT(*) AS count \
             FROM share_records s \
             JOIN cards c ON c.id = s.card_id \
             WHERE c.owner_id = $1 \
             GROUP BY s.platform ORDER BY count DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to group shares by platform", e)
        })
    }

    /// Shares of an owner's cards grouped by the card's kind.
    pub async fn shares_by_kind(&self, owner_id: Uuid) -> AppResult<Vec<KindCount>> {
        sqlx::query_as::<_, KindCount>(
            "SELECT c.kind AS kind, COUNT(*) AS count \
             FROM share_records s \
             JOIN cards c ON c.id = s.card_id \
             WHERE c.owner_id = $1 \
             GROUP BY c.kind ORDER BY count DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to group shares by kind", e)
        })
    }

    /// Share records of an owner's cards with an attributed signup.
    pub async fn attributed_signups(&self, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) \
             FROM share_records s \
             JOIN cards c ON c.id = s.card_id \
             WHERE c.owner_id = $1 AND s.signup_user_id IS NOT NULL",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count attributed signups", e)
        })
    }
}
