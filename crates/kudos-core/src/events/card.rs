//! Card lifecycle events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to card lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CardEvent {
    /// A card was created.
    Created {
        /// The card ID.
        card_id: Uuid,
        /// The owning user.
        owner_id: Uuid,
        /// The card kind (snake_case string form).
        kind: String,
    },
    /// A card's view count crossed a configured milestone exactly.
    MilestoneReached {
        /// The card ID.
        card_id: Uuid,
        /// The milestone view count that was reached.
        view_count: i64,
    },
    /// A card was deleted.
    Deleted {
        /// The card ID.
        card_id: Uuid,
        /// The owning user.
        owner_id: Uuid,
        /// Whether the row was purged (true) or soft-deleted (false).
        hard: bool,
    },
}
