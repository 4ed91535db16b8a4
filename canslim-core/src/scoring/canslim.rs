//! 7-point CANSLIM score used to rank symbols across markets.
//!
//! Every letter is approximated from price action:
//!
//! | Letter | Criterion |
//! | --- | --- |
//! | C | near the 52-week high |
//! | A | 6-month relative strength > 0 |
//! | N | fixed neutral placeholder |
//! | S | above the MA and the MA is rising |
//! | L | 6-month relative strength > 20 points |
//! | I | strength ratio >= 1.2 |
//! | M | MACD computable and no sell signal |

use serde::{Deserialize, Serialize};

use super::STRENGTH_RATIO_THRESHOLD;
use crate::signals::SignalSet;

/// Value of N. No data source detects new products or management, so the
/// letter contributes a constant half point to every symbol.
pub const NEW_PRODUCTS_PLACEHOLDER: f64 = 0.5;

/// Six-month relative strength (points) above which a symbol is a leader.
pub const LEADER_RS_THRESHOLD: f64 = 20.0;

pub const LETTERS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanslimScore {
    pub c: f64,
    pub a: f64,
    pub n: f64,
    pub s: f64,
    pub l: f64,
    pub i: f64,
    pub m: f64,
    pub total: f64,
    pub overall_score_percent: f64,
}

fn point(met: bool) -> f64 {
    if met {
        1.0
    } else {
        0.0
    }
}

impl CanslimScore {
    pub fn from_signals(signals: &SignalSet) -> Self {
        let rs6 = signals.relative_strength_6m();
        Self::from_letters([
            point(signals.near_52w_high()),
            point(rs6 > 0.0),
            NEW_PRODUCTS_PLACEHOLDER,
            point(signals.above_ma20w() && signals.ma20w_trending_up()),
            point(rs6 > LEADER_RS_THRESHOLD),
            point(signals.strength_ratio() >= STRENGTH_RATIO_THRESHOLD),
            point(signals.macd_available() && !signals.macd_sell_signal()),
        ])
    }

    pub fn from_letters(letters: [f64; LETTERS]) -> Self {
        let [c, a, n, s, l, i, m] = letters;
        let total: f64 = letters.iter().sum();
        Self {
            c,
            a,
            n,
            s,
            l,
            i,
            m,
            total,
            overall_score_percent: total / LETTERS as f64 * 100.0,
        }
    }

    pub fn letters(&self) -> [f64; LETTERS] {
        [self.c, self.a, self.n, self.s, self.l, self.i, self.m]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_alone_scores_about_seven_percent() {
        let s = CanslimScore::from_letters([0.0, 0.0, NEW_PRODUCTS_PLACEHOLDER, 0.0, 0.0, 0.0, 0.0]);
        assert!((s.overall_score_percent - 0.5 / 7.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn full_marks() {
        let s = CanslimScore::from_letters([1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(s.total, 6.5);
        assert!((s.overall_score_percent - 6.5 / 7.0 * 100.0).abs() < 1e-12);
        assert_eq!(s.letters()[2], 0.5);
    }
}
