//! Price series: an ordered run of daily bars for one symbol.
//!
//! Series are immutable once built. Construction normalizes provider output:
//! void bars are dropped, bars are sorted by date and duplicate dates keep the
//! last bar seen.

use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Bar;

/// Chronologically ascending daily bars for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from raw bars.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        let mut bars: Vec<Bar> = bars.into_iter().filter(|b| !b.is_void()).collect();
        bars.sort_by_key(|b| b.date);

        // Duplicate dates: keep the last occurrence
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Day-over-day percentage change of Close, as fractions.
    ///
    /// The first session has no prior close and is dropped, so the result has
    /// `len() - 1` entries, each keyed by the later session's date.
    pub fn daily_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.bars
            .windows(2)
            .map(|w| (w[1].date, w[1].close / w[0].close - 1.0))
            .collect()
    }

    /// Total return in percent from the close `horizon` sessions back
    /// (counting the last session as 1) to the last close.
    ///
    /// Returns `None` if fewer than `horizon` sessions exist.
    pub fn return_over(&self, horizon: usize) -> Option<f64> {
        let n = self.bars.len();
        if horizon == 0 || n < horizon {
            return None;
        }
        let start = self.bars[n - horizon].close;
        let end = self.bars[n - 1].close;
        Some((end / start - 1.0) * 100.0)
    }

    /// Close prices keyed by date.
    pub fn close_by_date(&self) -> BTreeMap<NaiveDate, f64> {
        self.bars.iter().map(|b| (b.date, b.close)).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Price history of a market index used as the relative-strength benchmark.
///
/// Loaded once per analyzer session and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSeries(PriceSeries);

impl BenchmarkSeries {
    pub fn new(series: PriceSeries) -> Self {
        Self(series)
    }

    pub fn into_inner(self) -> PriceSeries {
        self.0
    }
}

impl Deref for BenchmarkSeries {
    type Target = PriceSeries;

    fn deref(&self) -> &PriceSeries {
        &self.0
    }
}

/// Pair two close maps on their common dates, in date order.
pub fn aligned_closes(
    a: &BTreeMap<NaiveDate, f64>,
    b: &BTreeMap<NaiveDate, f64>,
) -> (Vec<f64>, Vec<f64>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (date, &va) in a {
        if let Some(&vb) = b.get(date) {
            left.push(va);
            right.push(vb);
        }
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            symbol: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn new_sorts_and_dedups() {
        let series = PriceSeries::new(
            "TEST",
            vec![bar(3, 12.0), bar(2, 11.0), bar(3, 13.0), bar(1, 10.0)],
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 13.0]);
    }

    #[test]
    fn new_drops_void_bars() {
        let mut void = bar(2, 11.0);
        void.close = f64::NAN;
        let series = PriceSeries::new("TEST", vec![bar(1, 10.0), void, bar(3, 12.0)]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn daily_returns_drop_first_session() {
        let series = PriceSeries::new("TEST", vec![bar(1, 100.0), bar(2, 110.0), bar(3, 99.0)]);
        let returns = series.daily_returns();
        assert_eq!(returns.len(), 2);
        assert!((returns[0].1 - 0.10).abs() < 1e-12);
        assert!((returns[1].1 - (-0.10)).abs() < 1e-12);
        assert_eq!(returns[0].0, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn return_over_counts_last_session() {
        let series = PriceSeries::new("TEST", vec![bar(1, 100.0), bar(2, 50.0), bar(3, 150.0)]);
        // horizon 3 → start is the first close
        assert!((series.return_over(3).unwrap() - 50.0).abs() < 1e-12);
        // horizon 2 → start is the second close
        assert!((series.return_over(2).unwrap() - 200.0).abs() < 1e-12);
        assert!(series.return_over(4).is_none());
        assert!(series.return_over(0).is_none());
    }

    #[test]
    fn aligned_closes_intersects_dates() {
        let a = PriceSeries::new("A", vec![bar(1, 1.0), bar(2, 2.0), bar(3, 3.0)]);
        let b = PriceSeries::new("B", vec![bar(2, 20.0), bar(3, 30.0), bar(4, 40.0)]);
        let (l, r) = aligned_closes(&a.close_by_date(), &b.close_by_date());
        assert_eq!(l, vec![2.0, 3.0]);
        assert_eq!(r, vec![20.0, 30.0]);
    }
}
