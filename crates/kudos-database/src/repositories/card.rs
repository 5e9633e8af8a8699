//! Card repository implementation.
//!
//! Transaction-scoped methods take a `&mut PgConnection` so that code
//! generation, existence checks, and the insert can share one atomic
//! transaction with the caller.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use kudos_core::error::{AppError, ErrorKind};
use kudos_core::result::AppResult;
use kudos_core::types::pagination::{PageRequest, PageResponse};
use kudos_entity::card::{Card, CreateCard};

use super::map_write_err;

/// Repository for card CRUD, code lookup, and counter operations.
#[derive(Debug, Clone)]
pub struct CardRepository {
    pool: PgPool,
}

impl CardRepository {
    /// Create a new card repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a card by ID, active or not.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Card>> {
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find card", e))
    }

    /// Find an active card by its public share code.
    pub async fn find_by_share_code(&self, share_code: &str) -> AppResult<Option<Card>> {
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE share_code = $1 AND is_active = TRUE")
            .bind(share_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find card by share code", e)
            })
    }

    /// Find an owner's card by idempotency key.
    pub async fn find_by_idempotency_key(
        &self,
        owner_id: Uuid,
        key: &str,
    ) -> AppResult<Option<Card>> {
        sqlx::query_as::<_, Card>(
            "SELECT * FROM cards WHERE owner_id = $1 AND idempotency_key = $2",
        )
        .bind(owner_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find card by idempotency key", e)
        })
    }

    /// List an owner's active cards, newest first.
    pub async fn find_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Card>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cards WHERE owner_id = $1 AND is_active = TRUE",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count cards", e))?;

        let cards = sqlx::query_as::<_, Card>(
            "SELECT * FROM cards WHERE owner_id = $1 AND is_active = TRUE \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list cards", e))?;

        Ok(PageResponse::new(
            cards,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Lifetime card count for an owner. Soft-deleted cards still count
    /// toward the total quota.
    pub async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count cards", e))
    }

    /// Cards created by an owner since `since`, for the rolling daily quota.
    pub async fn count_by_owner_since(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE owner_id = $1 AND created_at >= $2")
            .bind(owner_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count recent cards", e)
            })
    }

    /// Whether a referral code is already taken, under the caller's
    /// transaction isolation.
    pub async fn referral_code_exists(
        &self,
        tx: &mut PgConnection,
        code: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cards WHERE referral_code = $1)")
            .bind(code)
            .fetch_one(tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check referral code", e)
            })
    }

    /// Whether a share code is already taken, under the caller's
    /// transaction isolation.
    pub async fn share_code_exists(&self, tx: &mut PgConnection, code: &str) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cards WHERE share_code = $1)")
            .bind(code)
            .fetch_one(tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check share code", e)
            })
    }

    /// Insert a card inside the caller's transaction.
    ///
    /// Unique violations (codes, idempotency key) surface as conflicts.
    pub async fn insert(&self, tx: &mut PgConnection, data: &CreateCard) -> AppResult<Card> {
        sqlx::query_as::<_, Card>(
            "INSERT INTO cards (owner_id, kind, headline, subtext, metric_label, metric_value, \
             quote, referral_code, share_code, source_id, idempotency_key, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.kind)
        .bind(&data.content.headline)
        .bind(&data.content.subtext)
        .bind(&data.content.metric_label)
        .bind(&data.content.metric_value)
        .bind(&data.content.quote)
        .bind(&data.referral_code)
        .bind(&data.share_code)
        .bind(data.source_id)
        .bind(&data.idempotency_key)
        .bind(data.expires_at)
        .fetch_one(tx)
        .await
        .map_err(|e| map_write_err("Failed to insert card", e))
    }

    /// Atomically increment the view counter of an active card.
    ///
    /// Returns the new count, or `None` when the card is missing or
    /// inactive. Never read-modify-write in application code.
    pub async fn increment_view_count(&self, id: Uuid) -> AppResult<Option<i64>> {
        sqlx::query_scalar(
            "UPDATE cards SET view_count = view_count + 1, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to increment views", e))
    }

    /// Soft-delete a card. Returns whether a row was affected.
    pub async fn soft_delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE cards SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND is_active = TRUE",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to soft-delete card", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a card. Dependent share records are purged by the
    /// foreign-key cascade. Returns whether a row was affected.
    pub async fn hard_delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to hard-delete card", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
