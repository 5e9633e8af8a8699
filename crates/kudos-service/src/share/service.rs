//! Share recording and referral signup attribution.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use kudos_core::metrics::{counters, MetricsRegistry};
use kudos_core::events::{DomainEvent, EventPayload, ShareEvent};
use kudos_core::result::AppResult;
use kudos_core::traits::events::EventSink;
use kudos_database::repositories::ShareRecordRepository;
use kudos_entity::share::{CreateShareRecord, ShareRecord, SharePlatform};

use crate::card::CardService;
use crate::context::RequestContext;

/// Records shares of public cards and links signups back to referrals.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Share record repository.
    shares: Arc<ShareRecordRepository>,
    /// Card service for the cached public read.
    cards: Arc<CardService>,
    /// Event sink.
    events: Arc<dyn EventSink>,
    /// Operational counters.
    metrics: Arc<MetricsRegistry>,
    /// Days during which a referral can still claim a signup.
    attribution_window_days: i64,
}

impl ShareService {
    /// Create a new share service.
    pub fn new(
        shares: Arc<ShareRecordRepository>,
        cards: Arc<CardService>,
        events: Arc<dyn EventSink>,
        metrics: Arc<MetricsRegistry>,
        attribution_window_days: i64,
    ) -> Self {
        Self {
            shares,
            cards,
            events,
            metrics,
            attribution_window_days,
        }
    }

    /// Record that a public card was shared to a platform.
    ///
    /// The card's referral code is copied onto the record at write time
    /// so the record survives later card mutation. Client metadata is
    /// truncated to its column bounds.
    pub async fn record_share(
        &self,
        ctx: &RequestContext,
        share_code: &str,
        platform: SharePlatform,
    ) -> AppResult<ShareRecord> {
        let card = self.cards.get_public_card(share_code).await?;

        let record = self
            .shares
            .insert(
                &CreateShareRecord {
                    card_id: card.id,
                    platform,
                    referral_code: card.referral_code.clone(),
                    ip_address: ctx.ip_address.clone(),
                    user_agent: ctx.user_agent.clone(),
                }
                .truncated(),
            )
            .await?;

        self.metrics
            .incr_labeled(counters::SHARES_RECORDED, platform.as_str());
        self.events.emit(DomainEvent::new(
            None,
            EventPayload::Share(ShareEvent::Recorded {
                share_id: record.id,
                card_id: card.id,
                platform: platform.as_str().to_string(),
            }),
        ));

        info!(card_id = %card.id, platform = %platform, "Share recorded");
        Ok(record)
    }

    /// Attribute a signup to a referral code.
    ///
    /// Claims the earliest unlinked share for the code inside the
    /// attribution window; whichever linking call arrives first wins, and
    /// each record is linked at most once. Returns the claimed record,
    /// or `None` when nothing was attributable.
    pub async fn link_signup(
        &self,
        referral_code: &str,
        signup_user_id: Uuid,
    ) -> AppResult<Option<ShareRecord>> {
        let window_start = Utc::now() - chrono::Duration::days(self.attribution_window_days);
        let claimed = self
            .shares
            .link_signup(referral_code, signup_user_id, window_start)
            .await?;

        if let Some(record) = &claimed {
            self.events.emit(DomainEvent::new(
                Some(signup_user_id),
                EventPayload::Share(ShareEvent::SignupAttributed {
                    share_id: record.id,
                    referral_code: referral_code.to_string(),
                    signup_user_id,
                }),
            ));
            info!(
                share_id = %record.id,
                referral_code,
                "Signup attributed to referral"
            );
        }

        Ok(claimed)
    }
}
