//! Fire-and-forget public view counting.
//!
//! The serving request never waits on view accounting: deduplication,
//! the atomic counter increment, and milestone detection all run on a
//! spawned task, and every failure in that task is swallowed and logged.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use kudos_cache::ViewDedupGuard;
use kudos_core::events::{CardEvent, DomainEvent, EventPayload};
use kudos_core::metrics::{counters, MetricsRegistry};
use kudos_core::traits::events::EventSink;
use kudos_database::repositories::CardRepository;

/// Records public card views with replay resistance.
#[derive(Debug, Clone)]
pub struct ViewService {
    /// Card repository for the atomic increment.
    cards: Arc<CardRepository>,
    /// Per-(card, client) dedup window.
    guard: ViewDedupGuard,
    /// Event sink for milestone events.
    events: Arc<dyn EventSink>,
    /// Operational counters.
    metrics: Arc<MetricsRegistry>,
    /// View counts that fire a milestone event when reached exactly.
    milestones: Vec<i64>,
}

impl ViewService {
    /// Create a new view service.
    pub fn new(
        cards: Arc<CardRepository>,
        guard: ViewDedupGuard,
        events: Arc<dyn EventSink>,
        metrics: Arc<MetricsRegistry>,
        milestones: Vec<i64>,
    ) -> Self {
        Self {
            cards,
            guard,
            events,
            metrics,
            milestones,
        }
    }

    /// Record a public view of a card, fully asynchronously.
    ///
    /// Returns immediately; the caller's response never blocks on view
    /// accounting and never sees its failures.
    pub fn record_view(&self, card_id: Uuid, client_identifier: Option<String>) {
        let service = self.clone();
        tokio::spawn(async move {
            service.count_view(card_id, client_identifier.as_deref()).await;
        });
    }

    /// The actual accounting; also callable directly from tests.
    async fn count_view(&self, card_id: Uuid, client_identifier: Option<&str>) {
        if !self.guard.should_count(card_id, client_identifier).await {
            self.metrics.incr(counters::VIEWS_DEDUPLICATED);
            return;
        }

        match self.cards.increment_view_count(card_id).await {
            Ok(Some(new_count)) => {
                self.metrics.incr(counters::VIEWS_COUNTED);
                if reached_milestone(&self.milestones, new_count) {
                    self.events.emit(DomainEvent::new(
                        None,
                        EventPayload::Card(CardEvent::MilestoneReached {
                            card_id,
                            view_count: new_count,
                        }),
                    ));
                }
            }
            Ok(None) => {
                debug!(%card_id, "View on missing or inactive card not counted");
            }
            Err(e) => {
                // The public response already went out; nothing to raise.
                warn!(%card_id, error = %e, "View increment failed");
            }
        }
    }
}

/// Whether `new_count` lands exactly on a configured milestone.
///
/// Counts that skipped past a milestone never fire retroactively.
fn reached_milestone(milestones: &[i64], new_count: i64) -> bool {
    milestones.contains(&new_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_exactly_on_milestone() {
        let milestones = vec![100, 500, 1000];
        assert!(reached_milestone(&milestones, 100));
        assert!(reached_milestone(&milestones, 500));
        assert!(reached_milestone(&milestones, 1000));
    }

    #[test]
    fn test_never_fires_between_or_past_milestones() {
        let milestones = vec![100, 500, 1000];
        assert!(!reached_milestone(&milestones, 99));
        assert!(!reached_milestone(&milestones, 101));
        assert!(!reached_milestone(&milestones, 1001));
    }

    #[test]
    fn test_no_milestones_configured() {
        assert!(!reached_milestone(&[], 100));
    }
}
