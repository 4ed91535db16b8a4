//! Signal engine: per-symbol technical signals with explicit availability.
//!
//! Every signal is a pure function of the symbol's `PriceSeries` (and the
//! benchmark where relative). A signal that cannot be computed reports a
//! `SignalError` instead of a value; downstream scorers treat that as a
//! failed criterion, never as an abort.

pub mod beta;
pub mod high_52w;
pub mod macd;
pub mod moving_average;
pub mod relative_strength;
pub mod volatility;

pub use high_52w::High52w;
pub use macd::{EwmMacd, MacdCalculator, MacdReading, SeededMacd};
pub use moving_average::MovingAverageTrend;
pub use volatility::VolatilityProfile;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BenchmarkSeries, PriceSeries};

/// Why a signal is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SignalError {
    #[error("insufficient history: need {required} sessions, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("computation failed: {0}")]
    Computation(String),

    #[error("benchmark series unavailable")]
    BenchmarkUnavailable,
}

pub type SignalResult<T> = Result<T, SignalError>;

/// All signals for one symbol at one evaluation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub symbol: String,
    pub as_of: Option<NaiveDate>,
    pub sessions: usize,
    pub high_52w: SignalResult<High52w>,
    pub beta: SignalResult<f64>,
    pub relative_strength_3m: SignalResult<f64>,
    pub relative_strength_6m: SignalResult<f64>,
    pub moving_average: SignalResult<MovingAverageTrend>,
    pub macd: SignalResult<MacdReading>,
    pub volatility: SignalResult<VolatilityProfile>,
}

/// Evaluate every signal over one series.
///
/// `benchmark` is `None` when the session could not load it; beta and
/// relative strength then report `BenchmarkUnavailable`.
pub fn compute_signals(
    series: &PriceSeries,
    benchmark: Option<&BenchmarkSeries>,
    macd_calculator: &dyn MacdCalculator,
) -> SignalSet {
    SignalSet {
        symbol: series.symbol().to_string(),
        as_of: series.last_date(),
        sessions: series.len(),
        high_52w: high_52w::high_52w(series),
        beta: beta::beta(series, benchmark),
        relative_strength_3m: relative_strength::relative_strength(
            series,
            benchmark,
            relative_strength::THREE_MONTHS,
        ),
        relative_strength_6m: relative_strength::relative_strength(
            series,
            benchmark,
            relative_strength::SIX_MONTHS,
        ),
        moving_average: moving_average::moving_average_trend(series),
        macd: macd::macd_reading(series, macd_calculator),
        volatility: volatility::volatility_profile(series),
    }
}

impl SignalSet {
    pub fn near_52w_high(&self) -> bool {
        self.high_52w.as_ref().is_ok_and(|h| h.near_high)
    }

    pub fn distance_from_high_pct(&self) -> f64 {
        self.high_52w.as_ref().map_or(f64::NAN, |h| h.distance_pct)
    }

    /// NaN when unavailable.
    pub fn beta(&self) -> f64 {
        self.beta.clone().unwrap_or(f64::NAN)
    }

    /// NaN when unavailable.
    pub fn relative_strength_3m(&self) -> f64 {
        self.relative_strength_3m.clone().unwrap_or(f64::NAN)
    }

    /// NaN when unavailable.
    pub fn relative_strength_6m(&self) -> f64 {
        self.relative_strength_6m.clone().unwrap_or(f64::NAN)
    }

    /// Six-month relative strength is positive.
    pub fn outperforms_market(&self) -> bool {
        self.relative_strength_6m() > 0.0
    }

    pub fn above_ma20w(&self) -> bool {
        self.moving_average.as_ref().is_ok_and(|m| m.above_ma)
    }

    pub fn ma20w_slope(&self) -> Option<f64> {
        self.moving_average.as_ref().ok().and_then(|m| m.slope)
    }

    pub fn ma20w_trending_up(&self) -> bool {
        self.moving_average.as_ref().is_ok_and(|m| m.trending_up())
    }

    pub fn macd_available(&self) -> bool {
        self.macd.is_ok()
    }

    pub fn macd_current(&self) -> Option<f64> {
        self.macd.as_ref().ok().and_then(|m| m.current_macd)
    }

    pub fn macd_signal(&self) -> Option<f64> {
        self.macd.as_ref().ok().and_then(|m| m.current_signal)
    }

    pub fn macd_histogram(&self) -> Option<f64> {
        self.macd.as_ref().ok().and_then(|m| m.current_histogram)
    }

    /// Downward MACD reversal. False when MACD is unavailable; callers that
    /// need "no sell signal" must also check `macd_available`.
    pub fn macd_sell_signal(&self) -> bool {
        self.macd.as_ref().is_ok_and(|m| m.downward_reversal)
    }

    /// NaN when unavailable.
    pub fn volatility_20d_annualized(&self) -> f64 {
        self.volatility
            .as_ref()
            .map_or(f64::NAN, |v| v.volatility_20d_annualized)
    }

    /// NaN when unavailable.
    pub fn up_day_ratio(&self) -> f64 {
        self.volatility.as_ref().map_or(f64::NAN, |v| v.up_day_ratio)
    }

    /// NaN when unavailable, `+inf` when no session in the window fell.
    pub fn strength_ratio(&self) -> f64 {
        self.volatility.as_ref().map_or(f64::NAN, |v| v.strength_ratio)
    }

    /// Names and reasons of every unavailable signal.
    pub fn unavailable(&self) -> Vec<(&'static str, &SignalError)> {
        let mut out = Vec::new();
        if let Err(e) = &self.high_52w {
            out.push(("52w_high", e));
        }
        if let Err(e) = &self.beta {
            out.push(("beta", e));
        }
        if let Err(e) = &self.relative_strength_3m {
            out.push(("relative_strength_3m", e));
        }
        if let Err(e) = &self.relative_strength_6m {
            out.push(("relative_strength_6m", e));
        }
        if let Err(e) = &self.moving_average {
            out.push(("moving_average", e));
        }
        if let Err(e) = &self.macd {
            out.push(("macd", e));
        }
        if let Err(e) = &self.volatility {
            out.push(("volatility", e));
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{Bar, PriceSeries};
    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    /// Weekday-only daily bars starting 2020-01-01.
    pub fn daily_series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let mut date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut bars = Vec::with_capacity(closes.len());
        for &close in closes {
            while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                date += Duration::days(1);
            }
            bars.push(Bar {
                symbol: symbol.into(),
                date,
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 10_000,
            });
            date += Duration::days(1);
        }
        PriceSeries::new(symbol, bars)
    }

    /// Compounding growth at `daily` per session.
    pub fn compounding(n: usize, daily: f64) -> Vec<f64> {
        (0..n).map(|i| 100.0 * (1.0 + daily).powi(i as i32)).collect()
    }

    /// Compounding drift with a +/-1% oscillation, so returns have variance.
    pub fn wavy(n: usize, daily: f64) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 * (1.0 + daily).powi(i as i32) * (1.0 + 0.01 * (i as f64).sin()))
            .collect()
    }
}
