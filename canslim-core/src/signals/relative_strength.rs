//! Relative strength versus the benchmark.

use super::{SignalError, SignalResult};
use crate::domain::{aligned_closes, BenchmarkSeries, PriceSeries};

/// Roughly three months of sessions.
pub const THREE_MONTHS: usize = 63;
/// Roughly six months of sessions.
pub const SIX_MONTHS: usize = 126;

/// Stock return minus benchmark return over `horizon` common sessions, in
/// percentage points.
///
/// Both returns run from the close `horizon` sessions back (the last
/// session counts as one) to the last common close. Each horizon is gated
/// on its own overlap only.
pub fn relative_strength(
    stock: &PriceSeries,
    benchmark: Option<&BenchmarkSeries>,
    horizon: usize,
) -> SignalResult<f64> {
    let benchmark = benchmark.ok_or(SignalError::BenchmarkUnavailable)?;
    let (s, b) = aligned_closes(&stock.close_by_date(), &benchmark.close_by_date());

    let n = s.len();
    if horizon == 0 || n < horizon {
        return Err(SignalError::InsufficientHistory {
            required: horizon,
            available: n,
        });
    }

    let stock_return = (s[n - 1] / s[n - horizon] - 1.0) * 100.0;
    let bench_return = (b[n - 1] / b[n - horizon] - 1.0) * 100.0;
    let rs = stock_return - bench_return;

    if rs.is_finite() {
        Ok(rs)
    } else {
        Err(SignalError::Computation(format!(
            "relative strength over {horizon} sessions is not finite"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    fn ramp(n: usize, start: f64, end: f64) -> Vec<f64> {
        (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn outperformance_in_points() {
        let stock = PriceSeries::new("TEST", make_bars(&ramp(126, 100.0, 150.0)));
        let bench = BenchmarkSeries::new(PriceSeries::new("^B", make_bars(&ramp(126, 100.0, 110.0))));
        let rs = relative_strength(&stock, Some(&bench), SIX_MONTHS).unwrap();
        assert_approx(rs, 40.0, 1e-9);
    }

    #[test]
    fn horizons_are_gated_independently() {
        let stock = PriceSeries::new("TEST", make_bars(&ramp(100, 100.0, 120.0)));
        let bench = BenchmarkSeries::new(PriceSeries::new("^B", make_bars(&ramp(100, 100.0, 100.0))));
        assert!(relative_strength(&stock, Some(&bench), THREE_MONTHS).is_ok());
        assert_eq!(
            relative_strength(&stock, Some(&bench), SIX_MONTHS),
            Err(SignalError::InsufficientHistory {
                required: SIX_MONTHS,
                available: 100
            })
        );
    }

    #[test]
    fn missing_benchmark() {
        let stock = PriceSeries::new("TEST", make_bars(&ramp(200, 100.0, 120.0)));
        assert_eq!(
            relative_strength(&stock, None, THREE_MONTHS),
            Err(SignalError::BenchmarkUnavailable)
        );
    }
}
