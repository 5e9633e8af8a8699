//! Card entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::content::CardContent;
use super::kind::CardKind;

/// A shareable achievement card.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    /// Unique card identifier.
    pub id: Uuid,
    /// User who owns the card.
    pub owner_id: Uuid,
    /// Kind of achievement the card celebrates.
    pub kind: CardKind,
    /// Generated headline.
    pub headline: String,
    /// Generated supporting line.
    pub subtext: String,
    /// Label of the highlighted key metric.
    pub metric_label: String,
    /// Rendered value of the key metric.
    pub metric_value: String,
    /// Optional motivational quote.
    pub quote: Option<String>,
    /// Globally-unique referral code, immutable after creation.
    pub referral_code: String,
    /// Globally-unique share-path code, immutable after creation.
    pub share_code: String,
    /// The originating domain record (budget, goal, ...).
    pub source_id: Uuid,
    /// Public view counter. Monotonic, server-owned.
    pub view_count: i64,
    /// Soft-delete flag. Inactive cards are invisible to owner reads.
    pub is_active: bool,
    /// Client-supplied idempotency key (unique when present).
    pub idempotency_key: Option<String>,
    /// When the card stops being publicly viewable.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the card was created.
    pub created_at: DateTime<Utc>,
    /// Last time the card row was updated.
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Check whether the card is past its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Borrow the display payload as [`CardContent`].
    pub fn content(&self) -> CardContent {
        CardContent {
            headline: self.headline.clone(),
            subtext: self.subtext.clone(),
            metric_label: self.metric_label.clone(),
            metric_value: self.metric_value.clone(),
            quote: self.quote.clone(),
        }
    }
}

/// Data required to create a new card.
///
/// The unique codes are generated inside the create transaction and
/// supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCard {
    /// Owning user.
    pub owner_id: Uuid,
    /// Kind of achievement.
    pub kind: CardKind,
    /// Generated display payload.
    pub content: CardContent,
    /// Referral code (generated, unique).
    pub referral_code: String,
    /// Share-path code (generated, unique).
    pub share_code: String,
    /// The originating domain record.
    pub source_id: Uuid,
    /// Client-supplied idempotency key.
    pub idempotency_key: Option<String>,
    /// Expiry time (None = never).
    pub expires_at: Option<DateTime<Utc>>,
}
