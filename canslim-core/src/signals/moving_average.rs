//! 20-week moving-average trend, approximated with 100 daily sessions.

use serde::{Deserialize, Serialize};

use super::{SignalError, SignalResult};
use crate::domain::PriceSeries;
use crate::indicators::rolling_mean;
use crate::indicators::stats::linear_slope;

/// Trailing sessions in the moving average.
pub const MA_WINDOW: usize = 100;
/// Most recent MA values the slope is fitted over.
pub const SLOPE_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageTrend {
    pub ma_value: f64,
    pub above_ma: bool,
    /// OLS slope of the last 20 MA values against their index.
    /// `None` until 20 MA values exist.
    pub slope: Option<f64>,
}

impl MovingAverageTrend {
    pub fn trending_up(&self) -> bool {
        self.slope.is_some_and(|s| s > 0.0)
    }
}

pub fn moving_average_trend(series: &PriceSeries) -> SignalResult<MovingAverageTrend> {
    let closes = series.closes();
    if closes.len() < MA_WINDOW {
        return Err(SignalError::InsufficientHistory {
            required: MA_WINDOW,
            available: closes.len(),
        });
    }

    let ma: Vec<f64> = rolling_mean(&closes, MA_WINDOW)
        .into_iter()
        .skip(MA_WINDOW - 1)
        .collect();

    let ma_value = ma
        .last()
        .copied()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SignalError::Computation("moving average is not finite".into()))?;
    let last_close = closes[closes.len() - 1];

    let slope = if ma.len() >= SLOPE_WINDOW {
        linear_slope(&ma[ma.len() - SLOPE_WINDOW..])
    } else {
        None
    };

    Ok(MovingAverageTrend {
        ma_value,
        above_ma: last_close > ma_value,
        slope,
    })
}
