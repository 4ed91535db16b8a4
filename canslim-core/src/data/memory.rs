//! In-memory provider for fixtures, offline runs and failure injection.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::provider::{require_history, DataError, DataSource, HistoryPeriod, MarketDataProvider};
use crate::domain::PriceSeries;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, PriceSeries>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    /// Every fetch of `symbol` fails with a network error.
    pub fn with_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }

    /// Every fetch of `symbol` blocks for `delay` before answering.
    pub fn with_delay(mut self, symbol: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(symbol.into(), delay);
        self
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.series.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn source(&self) -> DataSource {
        DataSource::InMemory
    }

    /// Stored bars within `period` of the series' own last session.
    fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceSeries, DataError> {
        if let Some(delay) = self.delays.get(symbol) {
            std::thread::sleep(*delay);
        }
        if self.failing.contains(symbol) {
            return Err(DataError::NetworkUnreachable(format!(
                "simulated failure for {symbol}"
            )));
        }

        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;

        let Some(last) = series.last_date() else {
            return require_history(series.clone());
        };
        let start = period.start_from(last);
        let bars = series
            .bars()
            .iter()
            .filter(|b| b.date >= start)
            .cloned()
            .collect();
        require_history(PriceSeries::new(symbol, bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::daily_series;

    #[test]
    fn returns_stored_series() {
        let provider = InMemoryProvider::new().with_series(daily_series("A", &[1.0, 2.0, 3.0]));
        let s = provider.history("A", HistoryPeriod::TwoYears).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(provider.symbols(), vec!["A"]);
    }

    #[test]
    fn period_trims_old_bars() {
        let provider = InMemoryProvider::new().with_series(daily_series("A", &vec![10.0; 600]));
        let one = provider.history("A", HistoryPeriod::OneYear).unwrap();
        let two = provider.history("A", HistoryPeriod::TwoYears).unwrap();
        assert!(one.len() < two.len());
        assert!(one.len() >= 250);
    }

    #[test]
    fn unknown_and_failing_symbols() {
        let provider = InMemoryProvider::new()
            .with_series(daily_series("A", &[1.0]))
            .with_failure("A");
        assert!(matches!(
            provider.history("A", HistoryPeriod::OneYear),
            Err(DataError::NetworkUnreachable(_))
        ));
        assert!(matches!(
            provider.history("B", HistoryPeriod::OneYear),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn empty_series_is_empty_history() {
        let provider = InMemoryProvider::new().with_series(PriceSeries::new("E", vec![]));
        assert!(matches!(
            provider.history("E", HistoryPeriod::OneYear),
            Err(DataError::EmptyHistory { .. })
        ));
    }

    #[test]
    fn benchmark_history_wraps_series() {
        let provider = InMemoryProvider::new().with_series(daily_series("^KS11", &[1.0, 2.0]));
        let b = provider.benchmark_history("^KS11").unwrap();
        assert_eq!(b.symbol(), "^KS11");
    }
}
