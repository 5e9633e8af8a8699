//! Share record repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use kudos_core::error::{AppError, ErrorKind};
use kudos_core::result::AppResult;
use kudos_entity::share::{CreateShareRecord, ShareRecord};

use super::map_write_err;

/// Repository for share records and signup attribution.
#[derive(Debug, Clone)]
pub struct ShareRecordRepository {
    pool: PgPool,
}

impl ShareRecordRepository {
    /// Create a new share record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a share. Client metadata is expected to be pre-truncated.
    pub async fn insert(&self, data: &CreateShareRecord) -> AppResult<ShareRecord> {
        sqlx::query_as::<_, ShareRecord>(
            "INSERT INTO share_records (card_id, platform, referral_code, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.card_id)
        .bind(data.platform)
        .bind(&data.referral_code)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err("Failed to record share", e))
    }

    /// Attribute a signup to the earliest unlinked share for a referral
    /// code inside the attribution window.
    ///
    /// `FOR UPDATE SKIP LOCKED` makes concurrent linking calls race
    /// safely: exactly one claims the row, the rest see nothing.
    pub async fn link_signup(
        &self,
        referral_code: &str,
        signup_user_id: Uuid,
        window_start: DateTime<Utc>,
    ) -> AppResult<Option<ShareRecord>> {
        sqlx::query_as::<_, ShareRecord>(
            "UPDATE share_records SET signup_user_id = $1 \
             WHERE id = ( \
                 SELECT id FROM share_records \
                 WHERE referral_code = $2 AND signup_user_id IS NULL AND shared_at >= $3 \
                 ORDER BY shared_at \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING *",
        )
        .bind(signup_user_id)
        .bind(referral_code)
        .bind(window_start)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to link signup", e))
    }

    /// List shares recorded for a card, newest first.
    pub async fn find_by_card(&self, card_id: Uuid, limit: i64) -> AppResult<Vec<ShareRecord>> {
        sqlx::query_as::<_, ShareRecord>(
            "SELECT * FROM share_records WHERE card_id = $1 ORDER BY shared_at DESC LIMIT $2",
        )
        .bind(card_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))
    }
}
