//! Card kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of achievement kinds a card can celebrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "card_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// A savings or spending goal was reached.
    GoalAchieved,
    /// A budget period closed under its cap.
    BudgetSurplus,
    /// A debt balance milestone was paid down.
    DebtPaydown,
    /// A consecutive on-budget streak was kept.
    SavingsStreak,
}

impl CardKind {
    /// All kinds, for iteration in aggregations and tests.
    pub const ALL: [CardKind; 4] = [
        Self::GoalAchieved,
        Self::BudgetSurplus,
        Self::DebtPaydown,
        Self::SavingsStreak,
    ];

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoalAchieved => "goal_achieved",
            Self::BudgetSurplus => "budget_surplus",
            Self::DebtPaydown => "debt_paydown",
            Self::SavingsStreak => "savings_streak",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
