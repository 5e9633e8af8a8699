//! Share platform enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of platforms a card can be shared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_platform", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SharePlatform {
    /// Shared to X/Twitter.
    Twitter,
    /// Shared to Facebook.
    Facebook,
    /// Shared to Instagram.
    Instagram,
    /// Shared to LinkedIn.
    Linkedin,
    /// Shared to WhatsApp.
    Whatsapp,
    /// Share link copied to the clipboard.
    CopyLink,
}

impl SharePlatform {
    /// Return the platform as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Whatsapp => "whatsapp",
            Self::CopyLink => "copy_link",
        }
    }
}

impl fmt::Display for SharePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
