//! MACD on monthly bars, with downward-reversal detection.
//!
//! The MACD line itself is computed by a pluggable `MacdCalculator`. Two
//! conventions ship:
//!
//! - `EwmMacd`: bias-adjusted EWM from the first month on. This is the
//!   reference and the default.
//! - `SeededMacd`: SMA-seeded EMAs with warmup, the convention most
//!   technical-analysis libraries use. The signal line starts once the MACD
//!   line has 9 valid values.
//!
//! Both agree on the reversal flag whenever the histogram has a clear trend
//! over the last two months; they can differ on the exact histogram values.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::{SignalError, SignalResult};
use crate::domain::PriceSeries;
use crate::indicators::{ema_of_series, ewm_adjusted, monthly_bars};

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;
/// Monthly bars required before MACD is reported.
pub const MIN_MONTHLY_BARS: usize = SLOW_PERIOD + SIGNAL_PERIOD;

/// MACD line, signal line and histogram, aligned with the input closes.
/// Warmup positions are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    fn from_lines(macd: Vec<f64>, signal: Vec<f64>) -> Self {
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
        Self {
            macd,
            signal,
            histogram,
        }
    }
}

/// Strategy for computing MACD lines from a close series.
pub trait MacdCalculator: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn compute(&self, closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries;
}

/// Bias-adjusted EWM MACD.
#[derive(Debug, Clone, Copy, Default)]
pub struct EwmMacd;

impl MacdCalculator for EwmMacd {
    fn name(&self) -> &str {
        "ewm"
    }

    fn compute(&self, closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
        let fast_line = ewm_adjusted(closes, fast);
        let slow_line = ewm_adjusted(closes, slow);
        let macd: Vec<f64> = fast_line.iter().zip(&slow_line).map(|(f, s)| f - s).collect();
        let signal_line = ewm_adjusted(&macd, signal);
        MacdSeries::from_lines(macd, signal_line)
    }
}

/// SMA-seeded EMA MACD.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededMacd;

impl MacdCalculator for SeededMacd {
    fn name(&self) -> &str {
        "seeded"
    }

    fn compute(&self, closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
        let n = closes.len();
        let fast_line = ema_of_series(closes, fast);
        let slow_line = ema_of_series(closes, slow);
        let macd: Vec<f64> = fast_line.iter().zip(&slow_line).map(|(f, s)| f - s).collect();

        // The signal EMA is seeded from the first valid MACD values only.
        let mut signal_line = vec![f64::NAN; n];
        if let Some(first) = macd.iter().position(|v| !v.is_nan()) {
            let tail = ema_of_series(&macd[first..], signal);
            signal_line[first..].copy_from_slice(&tail);
        }

        MacdSeries::from_lines(macd, signal_line)
    }
}

/// Latest MACD state for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub current_macd: Option<f64>,
    pub current_signal: Option<f64>,
    pub current_histogram: Option<f64>,
    /// Histogram flipped from positive to negative, or deepened below zero,
    /// over the last two months. Signals that selling should be prepared.
    pub downward_reversal: bool,
    pub monthly_bars: usize,
}

/// Downward reversal over the last histogram values `[.., h1, h2]`:
/// `h1 > 0 && h2 < 0`, or `h2 < h1 < 0`. NaN never triggers.
pub fn downward_reversal(histogram: &[f64]) -> bool {
    let n = histogram.len();
    if n < 2 {
        return false;
    }
    let h1 = histogram[n - 2];
    let h2 = histogram[n - 1];
    (h1 > 0.0 && h2 < 0.0) || (h2 < h1 && h1 < 0.0)
}

/// Resample to calendar months and read the latest MACD state.
pub fn macd_reading(
    series: &PriceSeries,
    calculator: &dyn MacdCalculator,
) -> SignalResult<MacdReading> {
    let months = monthly_bars(series.bars());
    if months.len() < MIN_MONTHLY_BARS {
        return Err(SignalError::InsufficientHistory {
            required: MIN_MONTHLY_BARS,
            available: months.len(),
        });
    }

    let closes: Vec<f64> = months.iter().map(|m| m.close).collect();
    let lines = calculator.compute(&closes, FAST_PERIOD, SLOW_PERIOD, SIGNAL_PERIOD);

    let last_valid = |v: &[f64]| v.last().copied().filter(|x| x.is_finite());
    let current_histogram = last_valid(&lines.histogram);
    if current_histogram.is_none() {
        return Err(SignalError::Computation(format!(
            "{} MACD produced no histogram value",
            calculator.name()
        )));
    }

    let recent = &lines.histogram[lines.histogram.len().saturating_sub(3)..];
    Ok(MacdReading {
        current_macd: last_valid(&lines.macd),
        current_signal: last_valid(&lines.signal),
        current_histogram,
        downward_reversal: downward_reversal(recent),
        monthly_bars: months.len(),
    })
}
