//! Beta against the benchmark.

use std::collections::BTreeMap;

use super::{SignalError, SignalResult};
use crate::domain::{aligned_closes, BenchmarkSeries, PriceSeries};
use crate::indicators::stats::{population_variance, sample_covariance};

/// Minimum common return sessions before beta is reported.
pub const MIN_OVERLAP: usize = 30;

/// `cov(stock, market) / var(market)` over daily returns on common dates.
///
/// The covariance uses the sample (n - 1) denominator and the variance the
/// population (n) one. Scores and reports have always been produced with
/// this pairing, so it is kept.
pub fn beta(stock: &PriceSeries, benchmark: Option<&BenchmarkSeries>) -> SignalResult<f64> {
    let benchmark = benchmark.ok_or(SignalError::BenchmarkUnavailable)?;

    let stock_returns: BTreeMap<_, _> = stock.daily_returns().into_iter().collect();
    let market_returns: BTreeMap<_, _> = benchmark.daily_returns().into_iter().collect();
    let (s, m) = aligned_closes(&stock_returns, &market_returns);

    if s.len() < MIN_OVERLAP {
        return Err(SignalError::InsufficientHistory {
            required: MIN_OVERLAP,
            available: s.len(),
        });
    }

    let cov = sample_covariance(&s, &m)
        .ok_or_else(|| SignalError::Computation("covariance is not finite".into()))?;
    let var = population_variance(&m)
        .ok_or_else(|| SignalError::Computation("market variance is not finite".into()))?;
    if var == 0.0 {
        return Err(SignalError::Computation("market variance is zero".into()));
    }

    Ok(cov / var)
}
