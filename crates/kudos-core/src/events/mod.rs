//! Domain events emitted by Kudos Cards operations.
//!
//! Events are dispatched through the in-process event bus and consumed by
//! analytics, notification, and audit subscribers. Delivery is
//! fire-and-forget: no core behavior depends on it.

pub mod bus;
pub mod card;
pub mod share;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use card::CardEvent;
pub use share::ShareEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A card lifecycle event.
    Card(CardEvent),
    /// A sharing event.
    Share(ShareEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// The topic string this event is published under.
    pub fn topic(&self) -> &'static str {
        match &self.payload {
            EventPayload::Card(CardEvent::Created { .. }) => "card.created",
            EventPayload::Card(CardEvent::MilestoneReached { .. }) => "card.milestone",
            EventPayload::Card(CardEvent::Deleted { .. }) => "card.deleted",
            EventPayload::Share(ShareEvent::Recorded { .. }) => "share.recorded",
            EventPayload::Share(ShareEvent::SignupAttributed { .. }) => "share.signup",
        }
    }
}
