//! 6-point leadership score.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::STRENGTH_RATIO_THRESHOLD;
use crate::signals::SignalSet;

pub const MAX_SCORE: u8 = 6;

/// Letter grade over the score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 90.0 {
            Grade::APlus
        } else if pct >= 80.0 {
            Grade::A
        } else if pct >= 70.0 {
            Grade::BPlus
        } else if pct >= 60.0 {
            Grade::B
        } else if pct >= 50.0 {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criteria met, one point each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadershipCriteria {
    pub near_52w_high: bool,
    pub outperforms_market: bool,
    pub above_ma: bool,
    pub ma_trending_up: bool,
    pub no_macd_sell_signal: bool,
    pub strong_up_moves: bool,
}

impl LeadershipCriteria {
    pub fn from_signals(signals: &SignalSet) -> Self {
        Self {
            near_52w_high: signals.near_52w_high(),
            outperforms_market: signals.outperforms_market(),
            above_ma: signals.above_ma20w(),
            ma_trending_up: signals.ma20w_trending_up(),
            // Unavailable MACD cannot vouch for the absence of a sell signal.
            no_macd_sell_signal: signals.macd_available() && !signals.macd_sell_signal(),
            strong_up_moves: signals.strength_ratio() >= STRENGTH_RATIO_THRESHOLD,
        }
    }

    pub fn count(&self) -> u8 {
        [
            self.near_52w_high,
            self.outperforms_market,
            self.above_ma,
            self.ma_trending_up,
            self.no_macd_sell_signal,
            self.strong_up_moves,
        ]
        .iter()
        .filter(|&&met| met)
        .count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadershipScore {
    pub raw_score: u8,
    pub max_score: u8,
    pub percentage: f64,
    pub grade: Grade,
    pub criteria: LeadershipCriteria,
}

impl LeadershipScore {
    pub fn from_signals(signals: &SignalSet) -> Self {
        Self::from_criteria(LeadershipCriteria::from_signals(signals))
    }

    pub fn from_criteria(criteria: LeadershipCriteria) -> Self {
        let raw_score = criteria.count();
        let percentage = f64::from(raw_score) / f64::from(MAX_SCORE) * 100.0;
        Self {
            raw_score,
            max_score: MAX_SCORE,
            percentage,
            grade: Grade::from_percentage(percentage),
            criteria,
        }
    }
}
