//! Recommendation policy: (leadership score, caution score) → action.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Avoid / be very cautious.
    Avoid,
    CautiousBuy,
    StrongBuy,
    ConditionalBuy,
    HoldOff,
    /// The symbol could not be analysed.
    Unavailable,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Avoid => "avoid / very cautious",
            Action::CautiousBuy => "cautious buy",
            Action::StrongBuy => "strong buy",
            Action::ConditionalBuy => "conditional buy",
            Action::HoldOff => "hold off",
            Action::Unavailable => "analysis unavailable",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub reason: String,
    pub leadership_score: u8,
    pub caution_score: u8,
    pub confidence: u8,
}

pub const AVOID_CAUTION: u8 = 5;
pub const STRONG_LEADERSHIP: u8 = 5;
pub const ELEVATED_CAUTION: u8 = 3;
pub const MODERATE_LEADERSHIP: u8 = 3;

/// `clamp(leadership * 15 - caution * 10, 0, 100)`.
pub fn confidence(leadership_score: u8, caution_score: u8) -> u8 {
    let raw = i32::from(leadership_score) * 15 - i32::from(caution_score) * 10;
    raw.clamp(0, 100) as u8
}

/// First matching rule wins.
pub fn recommend(leadership_score: u8, caution_score: u8) -> Recommendation {
    let (action, reason) = if caution_score >= AVOID_CAUTION {
        (
            Action::Avoid,
            format!("{caution_score} caution signals active"),
        )
    } else if leadership_score >= STRONG_LEADERSHIP && caution_score >= ELEVATED_CAUTION {
        (
            Action::CautiousBuy,
            format!(
                "strong leadership ({leadership_score}/6) but {caution_score} caution signals active"
            ),
        )
    } else if leadership_score >= STRONG_LEADERSHIP {
        (
            Action::StrongBuy,
            format!("very strong leadership ({leadership_score}/6)"),
        )
    } else if leadership_score >= MODERATE_LEADERSHIP {
        (
            Action::ConditionalBuy,
            format!("moderate leadership ({leadership_score}/6)"),
        )
    } else {
        (
            Action::HoldOff,
            format!("weak leadership ({leadership_score}/6)"),
        )
    };

    Recommendation {
        action,
        reason,
        leadership_score,
        caution_score,
        confidence: confidence(leadership_score, caution_score),
    }
}

/// Recommendation for a symbol whose leadership evaluation failed.
pub fn unavailable(reason: impl Into<String>) -> Recommendation {
    Recommendation {
        action: Action::Unavailable,
        reason: reason.into(),
        leadership_score: 0,
        caution_score: 0,
        confidence: 0,
    }
}
