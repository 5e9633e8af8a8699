//! Generated card display content and privacy flags.

use serde::{Deserialize, Serialize};

/// The display payload produced by the content generator.
///
/// Opaque to the coordination layer: it is stored and served verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    /// Main headline, e.g. "Goal crushed!".
    pub headline: String,
    /// Supporting line under the headline.
    pub subtext: String,
    /// Label of the highlighted key metric.
    pub metric_label: String,
    /// Rendered value of the key metric.
    pub metric_value: String,
    /// Optional motivational quote.
    pub quote: Option<String>,
}

/// Privacy flags as requested by the client.
///
/// The two amount flags can conflict; [`PrivacyOptions::resolve`] decides
/// deterministically.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PrivacyOptions {
    /// Hide absolute amounts, showing only relative progress.
    #[serde(default)]
    pub hide_amounts: bool,
    /// Show exact amounts instead of rounded ones.
    #[serde(default)]
    pub show_exact_amounts: bool,
    /// Omit the owner's display name from the card.
    #[serde(default)]
    pub hide_owner_name: bool,
}

/// Privacy flags after conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrivacy {
    /// Whether amounts appear on the card at all.
    pub reveal_amounts: bool,
    /// Whether revealed amounts are exact rather than rounded.
    pub exact_amounts: bool,
    /// Whether the owner's display name appears.
    pub show_owner_name: bool,
}

impl PrivacyOptions {
    /// Resolve conflicting flags deterministically.
    ///
    /// `hide_amounts` wins over `show_exact_amounts` when both are set.
    /// Returns the resolved flags and whether a conflict was resolved, so
    /// the caller can log the decision.
    pub fn resolve(&self) -> (ResolvedPrivacy, bool) {
        let conflicted = self.hide_amounts && self.show_exact_amounts;
        let resolved = ResolvedPrivacy {
            reveal_amounts: !self.hide_amounts,
            exact_amounts: self.show_exact_amounts && !self.hide_amounts,
            show_owner_name: !self.hide_owner_name,
        };
        (resolved, conflicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_wins_over_exact() {
        let options = PrivacyOptions {
            hide_amounts: true,
            show_exact_amounts: true,
            hide_owner_name: false,
        };
        let (resolved, conflicted) = options.resolve();
        assert!(conflicted);
        assert!(!resolved.reveal_amounts);
        assert!(!resolved.exact_amounts);
    }

    #[test]
    fn test_defaults_reveal_rounded_amounts() {
        let (resolved, conflicted) = PrivacyOptions::default().resolve();
        assert!(!conflicted);
        assert!(resolved.reveal_amounts);
        assert!(!resolved.exact_amounts);
        assert!(resolved.show_owner_name);
    }
}
