//! 52-week high proximity.

use serde::{Deserialize, Serialize};

use super::{SignalError, SignalResult};
use crate::domain::PriceSeries;

/// Sessions in a trading year.
pub const WINDOW: usize = 252;

/// Close must be at least this fraction of the 52-week high to count as near.
pub const NEAR_HIGH_RATIO: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct High52w {
    pub current_price: f64,
    pub high_52w: f64,
    /// `(close / high - 1) * 100`; zero or negative in practice.
    pub distance_pct: f64,
    pub near_high: bool,
    /// Sessions actually covered by the high window (at most 252).
    pub sessions_used: usize,
}

impl High52w {
    /// True when the high was taken over a full trading year.
    pub fn full_window(&self) -> bool {
        self.sessions_used >= WINDOW
    }
}

/// Highest High over the trailing `min(252, n)` sessions, compared with the
/// last close.
///
/// The distance is reported from whatever window exists, but `near_high`
/// only holds when a full 252-session window backs it.
pub fn high_52w(series: &PriceSeries) -> SignalResult<High52w> {
    let bars = series.bars();
    let current_price = series.last_close().ok_or(SignalError::InsufficientHistory {
        required: WINDOW,
        available: 0,
    })?;

    let start = bars.len().saturating_sub(WINDOW);
    let window = &bars[start..];
    let high = window
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);

    if !high.is_finite() || high <= 0.0 {
        return Err(SignalError::Computation(format!(
            "non-positive 52-week high {high}"
        )));
    }

    let sessions_used = window.len();
    Ok(High52w {
        current_price,
        high_52w: high,
        distance_pct: (current_price / high - 1.0) * 100.0,
        near_high: sessions_used >= WINDOW && current_price >= NEAR_HIGH_RATIO * high,
        sessions_used,
    })
}
