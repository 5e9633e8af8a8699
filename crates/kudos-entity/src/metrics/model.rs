//! Per-owner engagement metrics derived from cards and share records.

use serde::{Deserialize, Serialize};

use crate::card::CardKind;
use crate::share::SharePlatform;

/// A grouped count keyed by card kind.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct KindCount {
    /// The card kind.
    pub kind: CardKind,
    /// Number of rows in the group.
    pub count: i64,
}

/// A grouped count keyed by share platform.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlatformCount {
    /// The share platform.
    pub platform: SharePlatform,
    /// Number of rows in the group.
    pub count: i64,
}

/// Aggregate viral/engagement statistics for one owner.
///
/// All grouped counts come from storage-layer aggregation; the ratios are
/// derived here with zero-division guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// Total active cards.
    pub total_cards: i64,
    /// Active cards grouped by kind.
    pub cards_by_kind: Vec<KindCount>,
    /// Sum of view counts across active cards.
    pub total_views: i64,
    /// Total recorded shares across the owner's cards.
    pub total_shares: i64,
    /// Shares grouped by platform.
    pub shares_by_platform: Vec<PlatformCount>,
    /// Shares grouped by the shared card's kind.
    pub shares_by_kind: Vec<KindCount>,
    /// Share records with an attributed signup.
    pub attributed_signups: i64,
    /// Signups per share.
    pub viral_coefficient: f64,
    /// Shares per view.
    pub share_conversion_rate: f64,
    /// Views per card.
    pub avg_views_per_card: f64,
}

impl EngagementMetrics {
    /// Compute the derived ratios from the raw aggregates.
    pub fn with_ratios(mut self) -> Self {
        self.viral_coefficient = ratio(self.attributed_signups, self.total_shares);
        self.share_conversion_rate = ratio(self.total_shares, self.total_views);
        self.avg_views_per_card = ratio(self.total_views, self.total_cards);
        self
    }
}

/// Safe division, 0.0 when the denominator is zero.
fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_metrics() -> EngagementMetrics {
        EngagementMetrics {
            total_cards: 0,
            cards_by_kind: Vec::new(),
            total_views: 0,
            total_shares: 0,
            shares_by_platform: Vec::new(),
            shares_by_kind: Vec::new(),
            attributed_signups: 0,
            viral_coefficient: 0.0,
            share_conversion_rate: 0.0,
            avg_views_per_card: 0.0,
        }
    }

    #[test]
    fn test_ratios_guard_zero_division() {
        let metrics = empty_metrics().with_ratios();
        assert_eq!(metrics.viral_coefficient, 0.0);
        assert_eq!(metrics.share_conversion_rate, 0.0);
        assert_eq!(metrics.avg_views_per_card, 0.0);
    }

    #[test]
    fn test_ratios() {
        let metrics = EngagementMetrics {
            total_cards: 4,
            total_views: 200,
            total_shares: 20,
            attributed_signups: 5,
            ..empty_metrics()
        }
        .with_ratios();

        assert_eq!(metrics.viral_coefficient, 0.25);
        assert_eq!(metrics.share_conversion_rate, 0.1);
        assert_eq!(metrics.avg_views_per_card, 50.0);
    }
}
