//! Sharing events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to sharing and referral attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A card was shared to a platform.
    Recorded {
        /// The share record ID.
        share_id: Uuid,
        /// The card that was shared.
        card_id: Uuid,
        /// The platform (snake_case string form).
        platform: String,
    },
    /// A signup was attributed to a referral code.
    SignupAttributed {
        /// The claimed share record ID.
        share_id: Uuid,
        /// The referral code that drove the signup.
        referral_code: String,
        /// The user who signed up.
        signup_user_id: Uuid,
    },
}
