//! Card generation orchestration.
//!
//! The sequence is: idempotency short-circuit, quota checks, source fetch
//! behind the circuit breaker, privacy-flag resolution, content
//! generation, then one atomic transaction that draws both unique codes
//! and inserts the card. Everything after the commit (event emission,
//! cache population) is best-effort and never rolls the create back.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use kudos_cache::{keys, CacheManager, CircuitBreaker};
use kudos_core::config::generation::GenerationConfig;
use kudos_core::error::{AppError, ErrorKind, LimitScope};
use kudos_core::events::{CardEvent, DomainEvent, EventPayload};
use kudos_core::metrics::{counters, MetricsRegistry};
use kudos_core::result::AppResult;
use kudos_core::traits::cache::CacheProvider;
use kudos_core::traits::events::EventSink;
use kudos_database::repositories::CardRepository;
use kudos_entity::card::{Card, CardContent, CardKind, CreateCard, PrivacyOptions};

use super::codes::{CodeNamespace, UniqueCodeGenerator};
use super::idempotency::IdempotencyGuard;
use crate::context::RequestContext;
use crate::traits::{ContentGenerator, SourceData, SourceFetcher};

/// Dependency key for the achievement source behind the circuit breaker.
pub const SOURCE_DEPENDENCY: &str = "achievement_source";

/// A request to generate a new card.
#[derive(Debug, Clone)]
pub struct GenerateCardRequest {
    /// Kind of achievement to celebrate.
    pub kind: CardKind,
    /// The originating domain record.
    pub source_id: Uuid,
    /// Client-supplied idempotency key.
    pub idempotency_key: Option<String>,
    /// Requested privacy flags (resolved deterministically on conflict).
    pub privacy: PrivacyOptions,
    /// When the card stops being publicly viewable.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Orchestrates card generation end to end.
#[derive(Debug, Clone)]
pub struct GenerationCoordinator {
    /// Pool for the create transaction.
    pool: PgPool,
    /// Card repository.
    cards: Arc<CardRepository>,
    /// Idempotency short-circuit.
    idempotency: IdempotencyGuard,
    /// Unique code generator.
    codes: UniqueCodeGenerator,
    /// Achievement source collaborator.
    source: Arc<dyn SourceFetcher>,
    /// Content generator collaborator.
    content: Arc<dyn ContentGenerator>,
    /// Circuit breaker guarding the source.
    breaker: CircuitBreaker,
    /// Shared cache store for post-commit population.
    cache: Arc<CacheManager>,
    /// Event sink for lifecycle events.
    events: Arc<dyn EventSink>,
    /// Operational counters.
    metrics: Arc<MetricsRegistry>,
    /// Quotas, timeouts, and TTLs.
    config: GenerationConfig,
}

impl GenerationCoordinator {
    /// Create a new generation coordinator.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        cards: Arc<CardRepository>,
        source: Arc<dyn SourceFetcher>,
        content: Arc<dyn ContentGenerator>,
        breaker: CircuitBreaker,
        cache: Arc<CacheManager>,
        events: Arc<dyn EventSink>,
        metrics: Arc<MetricsRegistry>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            pool,
            idempotency: IdempotencyGuard::new(Arc::clone(&cards)),
            codes: UniqueCodeGenerator::new(Arc::clone(&cards), &config),
            cards,
            source,
            content,
            breaker,
            cache,
            events,
            metrics,
            config,
        }
    }

    /// Generate a card for the current user.
    ///
    /// Calling twice with the same idempotency key returns the same card
    /// and performs no second write.
    pub async fn generate(
        &self,
        ctx: &RequestContext,
        req: GenerateCardRequest,
    ) -> AppResult<Card> {
        match self.generate_inner(ctx, req).await {
            Ok((card, replay)) => {
                if !replay {
                    self.metrics
                        .incr_labeled(counters::CARDS_GENERATED, card.kind.as_str());
                }
                Ok(card)
            }
            Err(e) => {
                self.metrics.incr(counters::CARDS_GENERATION_FAILED);
                Err(e)
            }
        }
    }

    async fn generate_inner(
        &self,
        ctx: &RequestContext,
        req: GenerateCardRequest,
    ) -> AppResult<(Card, bool)> {
        // 1. Idempotent replay: no new writes, no new events.
        if let Some(key) = &req.idempotency_key {
            if let Some(card) = self.idempotency.find_existing(ctx.user_id, key).await? {
                return Ok((card, true));
            }
        }

        // 2. Quotas, total first.
        self.check_quotas(ctx.user_id).await?;

        // 3. Source fetch behind the circuit breaker.
        let source_data = self.fetch_source(ctx.user_id, &req).await?;

        // 4. Privacy flag conflicts are resolved deterministically and
        //    on the record, never silently.
        let (privacy, conflicted) = req.privacy.resolve();
        if conflicted {
            info!(
                owner_id = %ctx.user_id,
                "Privacy flag conflict: hide_amounts overrides show_exact_amounts"
            );
        }

        // 5. Content generation (pure).
        let content = self.content.generate(req.kind, &source_data, &privacy)?;

        // 6. The one place correctness is guaranteed under concurrency.
        let card = match self.create_atomically(ctx.user_id, &req, content).await {
            Ok(card) => card,
            Err(e) if e.kind == ErrorKind::Conflict => {
                // A unique-key conflict usually means a concurrent twin
                // bearing the same idempotency key won the race; its card
                // is the correct answer.
                if let Some(key) = &req.idempotency_key {
                    if let Some(existing) = self.idempotency.find_existing(ctx.user_id, key).await?
                    {
                        return Ok((existing, true));
                    }
                }
                return Err(AppError::generation(format!(
                    "Card creation failed and was rolled back: {}",
                    e.message
                )));
            }
            Err(e) => return Err(e),
        };

        // 7. Post-commit: lifecycle event and cache population must not
        //    fail the request.
        self.events.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Card(CardEvent::Created {
                card_id: card.id,
                owner_id: card.owner_id,
                kind: card.kind.as_str().to_string(),
            }),
        ));
        self.populate_cache(card.clone());

        info!(
            owner_id = %ctx.user_id,
            card_id = %card.id,
            kind = %card.kind,
            "Card generated"
        );
        Ok((card, false))
    }

    /// Reject when the owner is at a lifetime or rolling-daily cap.
    async fn check_quotas(&self, owner_id: Uuid) -> AppResult<()> {
        let total = self.cards.count_by_owner(owner_id).await?;
        if total >= self.config.max_total_cards {
            return Err(AppError::limit_exceeded(LimitScope::Total));
        }

        let since = Utc::now() - chrono::Duration::hours(24);
        let daily = self.cards.count_by_owner_since(owner_id, since).await?;
        if daily >= self.config.max_daily_cards {
            return Err(AppError::limit_exceeded(LimitScope::Daily));
        }

        Ok(())
    }

    /// Fetch source data with a timeout, recording the outcome on the
    /// circuit. Source-not-found is a domain outcome and does not count
    /// as a circuit failure.
    async fn fetch_source(
        &self,
        owner_id: Uuid,
        req: &GenerateCardRequest,
    ) -> AppResult<SourceData> {
        self.breaker.check_allowed(SOURCE_DEPENDENCY).await?;

        let timeout = Duration::from_secs(self.config.source_timeout_seconds);
        let fetched =
            tokio::time::timeout(timeout, self.source.fetch(owner_id, req.kind, req.source_id))
                .await;

        match fetched {
            Ok(Ok(data)) => {
                self.breaker.record_success(SOURCE_DEPENDENCY).await;
                Ok(data)
            }
            Ok(Err(e)) if e.kind == ErrorKind::SourceNotFound => Err(e),
            Ok(Err(e)) => {
                self.breaker.record_failure(SOURCE_DEPENDENCY).await;
                Err(e)
            }
            Err(_elapsed) => {
                self.breaker.record_failure(SOURCE_DEPENDENCY).await;
                Err(AppError::service_unavailable(format!(
                    "Source fetch timed out after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }

    /// Run the create transaction with a bounded timeout.
    ///
    /// Any failure, including the timeout, leaves no partial card behind:
    /// dropping the transaction rolls it back. Non-domain errors are
    /// reported as a generation failure so callers can decide to retry.
    async fn create_atomically(
        &self,
        owner_id: Uuid,
        req: &GenerateCardRequest,
        content: CardContent,
    ) -> AppResult<Card> {
        let timeout = Duration::from_secs(self.config.transaction_timeout_seconds);
        let created =
            tokio::time::timeout(timeout, self.create_in_transaction(owner_id, req, content)).await;

        match created {
            Ok(Ok(card)) => Ok(card),
            // Generation and conflict errors keep their kind; everything
            // else becomes a generic generation failure distinguishable
            // from domain errors.
            Ok(Err(e)) => match e.kind {
                ErrorKind::Generation | ErrorKind::Conflict => Err(e),
                _ => Err(AppError::generation(format!(
                    "Card creation failed and was rolled back: {}",
                    e.message
                ))),
            },
            Err(_elapsed) => Err(AppError::generation(
                "Create transaction timed out and was rolled back; no card was created",
            )),
        }
    }

    async fn create_in_transaction(
        &self,
        owner_id: Uuid,
        req: &GenerateCardRequest,
        content: CardContent,
    ) -> AppResult<Card> {
        // Postgres read-committed isolation is sufficient: the unique
        // constraints decide every race.
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let referral_code = self
            .codes
            .generate_unique(&mut *tx, CodeNamespace::Referral)
            .await?;
        let share_code = self
            .codes
            .generate_unique(&mut *tx, CodeNamespace::SharePath)
            .await?;

        let create = CreateCard {
            owner_id,
            kind: req.kind,
            content,
            referral_code,
            share_code,
            source_id: req.source_id,
            idempotency_key: req.idempotency_key.clone(),
            expires_at: req.expires_at,
        };

        let card = self.cards.insert(&mut *tx, &create).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Transaction commit failed: {e}"),
                e,
            )
        })?;

        Ok(card)
    }

    /// Write the fresh card into both cache entries from a spawned task.
    fn populate_cache(&self, card: Card) {
        let cache = Arc::clone(&self.cache);
        let ttl = Duration::from_secs(self.config.card_cache_ttl_seconds);
        let public_ttl = Duration::from_secs(self.config.public_cache_ttl_seconds);
        tokio::spawn(async move {
            if let Err(e) = cache.set_json(&keys::card_by_id(card.id), &card, ttl).await {
                warn!(card_id = %card.id, error = %e, "Card cache population failed");
            }
            if let Err(e) = cache
                .set_json(&keys::card_by_share_code(&card.share_code), &card, public_ttl)
                .await
            {
                warn!(card_id = %card.id, error = %e, "Share-page cache population failed");
            }
        });
    }
}
