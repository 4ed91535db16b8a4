//! Deterministic synthetic price history for offline development.
//!
//! Each symbol gets a random walk seeded from the BLAKE3 hash of its name, so
//! the same symbol always produces the same bars. The data is clearly fake
//! and reports `DataSource::Synthetic`.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{require_history, DataError, DataSource, HistoryPeriod, MarketDataProvider};
use crate::domain::{Bar, PriceSeries};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    /// Walks ending on `end` (inclusive).
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }

    pub fn ending_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Generate weekday bars from `start` to `end` inclusive.
///
/// Each symbol draws its own drift, so some trend up and some down.
pub fn generate_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let drift: f64 = rng.gen_range(-0.0015..0.0025);
    let spread: f64 = rng.gen_range(0.01..0.03);
    let mut price: f64 = rng.gen_range(20.0..500.0);

    let mut bars = Vec::new();
    let mut current = start;
    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return = drift + rng.gen_range(-spread..spread);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            symbol: symbol.to_string(),
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceSeries, DataError> {
        let start = period.start_from(self.end);
        require_history(PriceSeries::new(symbol, generate_bars(symbol, start, self.end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap())
    }

    #[test]
    fn deterministic_per_symbol() {
        let a = provider().history("AAPL", HistoryPeriod::TwoYears).unwrap();
        let b = provider().history("AAPL", HistoryPeriod::TwoYears).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn symbols_differ() {
        let a = provider().history("AAPL", HistoryPeriod::OneYear).unwrap();
        let b = provider().history("MSFT", HistoryPeriod::OneYear).unwrap();
        assert_ne!(a.closes(), b.closes());
    }

    #[test]
    fn weekdays_only_and_sane() {
        let s = provider().history("005930.KS", HistoryPeriod::TwoYears).unwrap();
        assert!(s.len() > 500);
        for bar in s.bars() {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.open > 0.0 && bar.close > 0.0, "{bar:?}");
            assert!(bar.high >= bar.open.max(bar.close), "{bar:?}");
            assert!(bar.low <= bar.open.min(bar.close), "{bar:?}");
        }
    }

    #[test]
    fn two_years_covers_everything_but_monthly_macd() {
        use crate::signals::{compute_signals, EwmMacd};
        // ~520 sessions but only ~25 monthly bars
        let p = provider();
        let s = p.history("NVDA", HistoryPeriod::TwoYears).unwrap();
        let b = p.benchmark_history("^KS11").unwrap();
        let set = compute_signals(&s, Some(&b), &EwmMacd);
        assert!(set.high_52w.is_ok());
        assert!(set.beta.is_ok());
        assert!(set.relative_strength_6m.is_ok());
        assert!(set.moving_average.is_ok());
        assert!(set.volatility.is_ok());
        assert!(set.macd.is_err());

        let s5 = p.history("NVDA", HistoryPeriod::FiveYears).unwrap();
        assert!(compute_signals(&s5, Some(&b), &EwmMacd).macd.is_ok());
    }
}
