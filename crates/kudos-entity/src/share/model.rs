//! Share record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::platform::SharePlatform;

/// Maximum stored length for a client IP address (IPv6 textual form).
pub const MAX_IP_ADDRESS_LEN: usize = 45;
/// Maximum stored length for a client user agent.
pub const MAX_USER_AGENT_LEN: usize = 512;

/// A recorded share of a card to an external platform.
///
/// Ownership is inherited from the card the record references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareRecord {
    /// Unique share record identifier.
    pub id: Uuid,
    /// The card that was shared.
    pub card_id: Uuid,
    /// Platform the card was shared to.
    pub platform: SharePlatform,
    /// Referral code copied from the card at write time, so the record
    /// survives later card mutation.
    pub referral_code: String,
    /// Signup later attributed to this share, set at most once.
    pub signup_user_id: Option<Uuid>,
    /// Client IP address, truncated to [`MAX_IP_ADDRESS_LEN`].
    pub ip_address: Option<String>,
    /// Client user agent, truncated to [`MAX_USER_AGENT_LEN`].
    pub user_agent: Option<String>,
    /// When the share happened.
    pub shared_at: DateTime<Utc>,
}

/// Data required to record a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRecord {
    /// The card being shared.
    pub card_id: Uuid,
    /// Target platform.
    pub platform: SharePlatform,
    /// Referral code copied from the card.
    pub referral_code: String,
    /// Client IP address (will be truncated).
    pub ip_address: Option<String>,
    /// Client user agent (will be truncated).
    pub user_agent: Option<String>,
}

impl CreateShareRecord {
    /// Truncate client metadata to the stored column bounds.
    pub fn truncated(mut self) -> Self {
        self.ip_address = self.ip_address.map(|ip| truncate(ip, MAX_IP_ADDRESS_LEN));
        self.user_agent = self.user_agent.map(|ua| truncate(ua, MAX_USER_AGENT_LEN));
        self
    }
}

/// Truncate a string to at most `max` bytes on a char boundary.
fn truncate(value: String, max: usize) -> String {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_truncated() {
        let record = CreateShareRecord {
            card_id: Uuid::new_v4(),
            platform: SharePlatform::Twitter,
            referral_code: "REF12345".to_string(),
            ip_address: Some("1".repeat(100)),
            user_agent: Some("a".repeat(1000)),
        }
        .truncated();

        assert_eq!(record.ip_address.unwrap().len(), MAX_IP_ADDRESS_LEN);
        assert_eq!(record.user_agent.unwrap().len(), MAX_USER_AGENT_LEN);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let truncated = truncate("héllo".to_string(), 2);
        assert_eq!(truncated, "h");
    }
}
