//! Short-horizon volatility and up/down strength.

use serde::{Deserialize, Serialize};

use super::{SignalError, SignalResult};
use crate::domain::PriceSeries;
use crate::indicators::stats::{mean, sample_std};

/// Trailing daily returns examined.
pub const WINDOW: usize = 20;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    /// Sample std of the last 20 daily returns times sqrt(252), as a fraction.
    pub volatility_20d_annualized: f64,
    pub up_day_ratio: f64,
    /// Mean of the positive returns in the window, 0 when there are none.
    pub avg_up_return: f64,
    /// Mean of the negative returns in the window, 0 when there are none.
    pub avg_down_return: f64,
    /// `|avg_up / avg_down|`; `+inf` when no session in the window fell.
    #[serde(with = "unbounded")]
    pub strength_ratio: f64,
}

pub fn volatility_profile(series: &PriceSeries) -> SignalResult<VolatilityProfile> {
    let returns: Vec<f64> = series.daily_returns().into_iter().map(|(_, r)| r).collect();
    if returns.len() < WINDOW {
        return Err(SignalError::InsufficientHistory {
            required: WINDOW,
            available: returns.len(),
        });
    }

    let recent = &returns[returns.len() - WINDOW..];
    let std = sample_std(recent)
        .ok_or_else(|| SignalError::Computation("return std is not finite".into()))?;

    let ups: Vec<f64> = recent.iter().copied().filter(|r| *r > 0.0).collect();
    let downs: Vec<f64> = recent.iter().copied().filter(|r| *r < 0.0).collect();
    let avg_up = mean(&ups).unwrap_or(0.0);
    let avg_down = mean(&downs).unwrap_or(0.0);

    let strength_ratio = if avg_down == 0.0 {
        f64::INFINITY
    } else {
        (avg_up / avg_down).abs()
    };

    Ok(VolatilityProfile {
        volatility_20d_annualized: std * TRADING_DAYS_PER_YEAR.sqrt(),
        up_day_ratio: ups.len() as f64 / WINDOW as f64,
        avg_up_return: avg_up,
        avg_down_return: avg_down,
        strength_ratio,
    })
}

/// JSON has no infinity; `+inf` is written as `null` and read back.
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_infinite() && v.is_sign_positive() {
            s.serialize_none()
        } else {
            s.serialize_some(v)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
    }
}
