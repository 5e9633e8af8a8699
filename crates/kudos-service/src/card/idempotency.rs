//! Idempotency short-circuit for card generation.
//!
//! A pure lookup on the unique `idempotency_key` index. No locking: the
//! storage-layer unique constraint, re-enforced at insert time, is the
//! actual safety net when two requests with the same key race. This
//! guard only avoids redundant work on retries.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use kudos_core::result::AppResult;
use kudos_database::repositories::CardRepository;
use kudos_entity::card::Card;

/// Maps a client-supplied idempotency key to a previously created card.
#[derive(Debug, Clone)]
pub struct IdempotencyGuard {
    /// Card repository for key lookup.
    cards: Arc<CardRepository>,
}

impl IdempotencyGuard {
    /// Create a new idempotency guard.
    pub fn new(cards: Arc<CardRepository>) -> Self {
        Self { cards }
    }

    /// Find the card previously created for this key, if any.
    pub async fn find_existing(&self, owner_id: Uuid, key: &str) -> AppResult<Option<Card>> {
        let existing = self.cards.find_by_idempotency_key(owner_id, key).await?;
        if let Some(card) = &existing {
            info!(
                owner_id = %owner_id,
                card_id = %card.id,
                "Idempotent replay, returning existing card"
            );
        }
        Ok(existing)
    }
}
