//! Card read and delete paths.
//!
//! All reads are cache-aside through the stampede-safe coordinator.
//! Ownership and expiry are enforced *after* the cache fetch, so an
//! expired card can still be served from cache and correctly reported as
//! expired, and an unauthorized caller learns nothing about existence.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use kudos_cache::{keys, CacheCoordinator};
use kudos_core::config::generation::GenerationConfig;
use kudos_core::error::AppError;
use kudos_core::events::{CardEvent, DomainEvent, EventPayload};
use kudos_core::result::AppResult;
use kudos_core::traits::events::EventSink;
use kudos_core::types::pagination::{PageRequest, PageResponse};
use kudos_database::repositories::CardRepository;
use kudos_entity::card::Card;

use crate::context::RequestContext;

/// Message shown to callers who must not learn whether the card exists.
const NOT_FOUND_MESSAGE: &str = "Card not found";

/// Owner-facing and public card read/delete operations.
#[derive(Debug, Clone)]
pub struct CardService {
    /// Card repository.
    cards: Arc<CardRepository>,
    /// Stampede-safe cache-aside coordinator.
    coordinator: CacheCoordinator,
    /// Event sink for lifecycle events.
    events: Arc<dyn EventSink>,
    /// TTL for card-by-id cache entries.
    card_ttl: Duration,
    /// TTL for public share-page cache entries.
    public_ttl: Duration,
}

impl CardService {
    /// Create a new card service.
    pub fn new(
        cards: Arc<CardRepository>,
        coordinator: CacheCoordinator,
        events: Arc<dyn EventSink>,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            cards,
            coordinator,
            events,
            card_ttl: Duration::from_secs(config.card_cache_ttl_seconds),
            public_ttl: Duration::from_secs(config.public_cache_ttl_seconds),
        }
    }

    /// Get a card for its owner.
    ///
    /// Missing and inactive cards are not-found; an ownership mismatch is
    /// access-denied with an identical message; expiry is reported only
    /// once ownership is established.
    pub async fn get_card(&self, ctx: &RequestContext, card_id: Uuid) -> AppResult<Card> {
        let cards = Arc::clone(&self.cards);
        let card: Card = self
            .coordinator
            .get_or_load(
                &keys::card_by_id(card_id),
                &keys::card_lock(card_id),
                self.card_ttl,
                || async move {
                    cards
                        .find_by_id(card_id)
                        .await?
                        .filter(|c| c.is_active)
                        .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))
                },
            )
            .await?;

        if card.owner_id != ctx.user_id {
            return Err(AppError::access_denied(NOT_FOUND_MESSAGE));
        }
        if card.is_expired() {
            return Err(AppError::expired("Card has expired"));
        }
        Ok(card)
    }

    /// Get a card for its public share page, by share code.
    pub async fn get_public_card(&self, share_code: &str) -> AppResult<Card> {
        let cards = Arc::clone(&self.cards);
        let code = share_code.to_string();
        let card: Card = self
            .coordinator
            .get_or_load(
                &keys::card_by_share_code(share_code),
                &keys::share_code_lock(share_code),
                self.public_ttl,
                || async move {
                    cards
                        .find_by_share_code(&code)
                        .await?
                        .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))
                },
            )
            .await?;

        if card.is_expired() {
            return Err(AppError::expired("Card has expired"));
        }
        Ok(card)
    }

    /// List the owner's active cards, newest first.
    pub async fn list_cards(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Card>> {
        self.cards.find_by_owner(ctx.user_id, &page).await
    }

    /// Delete a card: soft by default, hard purges the row and its share
    /// records. Both invalidate the cache entries and emit an event.
    pub async fn delete_card(&self, ctx: &RequestContext, card_id: Uuid, hard: bool) -> AppResult<()> {
        // Authoritative read, not the cache: deletion must see the row
        // as it is now.
        let card = self
            .cards
            .find_by_id(card_id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

        if card.owner_id != ctx.user_id {
            return Err(AppError::access_denied(NOT_FOUND_MESSAGE));
        }
        if !hard && !card.is_active {
            return Err(AppError::not_found(NOT_FOUND_MESSAGE));
        }

        let deleted = if hard {
            self.cards.hard_delete(ctx.user_id, card_id).await?
        } else {
            self.cards.soft_delete(ctx.user_id, card_id).await?
        };
        if !deleted {
            return Err(AppError::not_found(NOT_FOUND_MESSAGE));
        }

        self.coordinator.invalidate(&keys::card_by_id(card_id)).await;
        self.coordinator
            .invalidate(&keys::card_by_share_code(&card.share_code))
            .await;

        self.events.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Card(CardEvent::Deleted {
                card_id,
                owner_id: ctx.user_id,
                hard,
            }),
        ));

        info!(owner_id = %ctx.user_id, card_id = %card_id, hard, "Card deleted");
        Ok(())
    }
}
