//! Market data provider trait and structured error types.
//!
//! `MarketDataProvider` abstracts over data sources (Yahoo Finance, in-memory
//! fixtures, synthetic random walks) so the analyzer can swap implementations
//! and tests can inject failures.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BenchmarkSeries, Market, PriceSeries};

/// Structured error types for data operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price history for {symbol}")]
    EmptyHistory { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    #[error("data error: {0}")]
    Other(String),
}

/// How far back a history request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1y")]
    OneYear,
    #[default]
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl HistoryPeriod {
    pub fn calendar_days(&self) -> i64 {
        match self {
            HistoryPeriod::OneYear => 365,
            HistoryPeriod::TwoYears => 730,
            HistoryPeriod::FiveYears => 1826,
        }
    }

    /// First calendar day covered when the period ends on `end`.
    pub fn start_from(&self, end: NaiveDate) -> NaiveDate {
        end - Duration::days(self.calendar_days())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(HistoryPeriod::OneYear),
            "2y" => Ok(HistoryPeriod::TwoYears),
            "5y" => Ok(HistoryPeriod::FiveYears),
            other => Err(format!("unknown history period '{other}' (expected 1y, 2y or 5y)")),
        }
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    InMemory,
    Synthetic,
}

/// Source of daily price history.
///
/// Implementations must be shareable across the ranker's worker threads.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Daily bars for `symbol` covering `period` up to the latest session.
    ///
    /// An empty result is an error (`EmptyHistory`), never an empty series.
    fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceSeries, DataError>;

    /// History of a market index used as the relative-strength benchmark.
    fn benchmark_history(&self, symbol: &str) -> Result<BenchmarkSeries, DataError> {
        self.history(symbol, HistoryPeriod::default())
            .map(BenchmarkSeries::new)
    }
}

/// Source of the symbols that make up a market basket.
pub trait SymbolSource: Send + Sync {
    fn list_symbols(&self, market: Market) -> Vec<String>;
}

/// Reject empty series, and series with non-positive closes that would
/// poison every return computed from them.
pub fn require_history(series: PriceSeries) -> Result<PriceSeries, DataError> {
    if series.is_empty() {
        return Err(DataError::EmptyHistory {
            symbol: series.symbol().to_string(),
        });
    }
    if let Some(bad) = series.bars().iter().find(|b| b.close <= 0.0) {
        return Err(DataError::InvalidSeries(format!(
            "{}: non-positive close {} on {}",
            bad.symbol, bad.close, bad.date
        )));
    }
    Ok(series)
}
