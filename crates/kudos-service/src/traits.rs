//! Collaborator traits the coordination layer depends on.
//!
//! Both collaborators are opaque: the coordination layer never looks
//! inside the fetched source data or the generated content.

use async_trait::async_trait;
use uuid::Uuid;

use kudos_core::result::AppResult;
use kudos_entity::card::{CardContent, CardKind, ResolvedPrivacy};

/// Domain data backing a card, fetched from the achievement system.
///
/// The payload is deliberately untyped: only the content generator
/// interprets it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SourceData {
    /// The originating domain record.
    pub source_id: Uuid,
    /// Opaque attributes of the achievement.
    pub attributes: serde_json::Value,
}

/// Fetches the domain record a card is generated from.
///
/// Fails with a source-not-found error when the record is missing or
/// ineligible; those are domain outcomes, not dependency failures.
#[async_trait]
pub trait SourceFetcher: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the source data for an owner's achievement.
    async fn fetch(&self, owner_id: Uuid, kind: CardKind, source_id: Uuid)
    -> AppResult<SourceData>;
}

/// Generates the display content of a card.
///
/// Pure function of the source data and the resolved privacy flags.
pub trait ContentGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Produce the display payload for a card.
    fn generate(
        &self,
        kind: CardKind,
        source: &SourceData,
        privacy: &ResolvedPrivacy,
    ) -> AppResult<CardContent>;
}
