//! Analyzer session.
//!
//! A session owns the data provider handle and the benchmark series, loaded
//! once at construction and shared read-only by every evaluation. Sessions
//! are `Send + Sync` and are shared across the ranker's workers behind an
//! `Arc`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::caution::{CautionEvaluator, CautionResult, DEFAULT_HIGH_CAUTION_THRESHOLD};
use crate::data::{DataError, DataSource, HistoryPeriod, MarketDataProvider};
use crate::domain::{BenchmarkSeries, PriceSeries};
use crate::scoring::{CanslimScore, LeadershipScore};
use crate::signals::{compute_signals, EwmMacd, MacdCalculator, SeededMacd, SignalSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("data unavailable for {symbol}: {source}")]
    DataUnavailable {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("no usable price history among {requested} requested symbols")]
    NoUsableData {
        requested: usize,
        unavailable: Vec<String>,
    },
}

/// Which MACD convention the session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdStrategy {
    #[default]
    Ewm,
    Seeded,
}

impl MacdStrategy {
    pub fn calculator(&self) -> &'static dyn MacdCalculator {
        match self {
            MacdStrategy::Ewm => &EwmMacd,
            MacdStrategy::Seeded => &SeededMacd,
        }
    }
}

impl fmt::Display for MacdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.calculator().name())
    }
}

impl FromStr for MacdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ewm" => Ok(MacdStrategy::Ewm),
            "seeded" => Ok(MacdStrategy::Seeded),
            other => Err(format!("unknown MACD strategy '{other}' (expected ewm or seeded)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    pub history_period: HistoryPeriod,
    pub macd: MacdStrategy,
    pub high_caution_threshold: u8,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            history_period: HistoryPeriod::default(),
            macd: MacdStrategy::default(),
            high_caution_threshold: DEFAULT_HIGH_CAUTION_THRESHOLD,
        }
    }
}

/// Signals and both rubrics for one symbol, from a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipEvaluation {
    pub symbol: String,
    /// Date of the last session in the evaluated history.
    pub analysis_date: Option<NaiveDate>,
    pub current_price: Option<f64>,
    pub data_source: DataSource,
    pub signals: SignalSet,
    pub leadership: LeadershipScore,
    pub canslim: CanslimScore,
}

pub struct AnalyzerSession {
    provider: Arc<dyn MarketDataProvider>,
    benchmark_symbol: String,
    benchmark: Option<Arc<BenchmarkSeries>>,
    options: AnalyzerOptions,
    caution: CautionEvaluator,
}

impl fmt::Debug for AnalyzerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerSession")
            .field("provider", &self.provider.name())
            .field("benchmark_symbol", &self.benchmark_symbol)
            .field("benchmark_loaded", &self.benchmark.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl AnalyzerSession {
    /// Create a session and load the benchmark once.
    ///
    /// A benchmark that cannot be loaded is logged, not fatal: the session
    /// still evaluates symbols and benchmark-relative signals report
    /// `BenchmarkUnavailable`.
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        benchmark_symbol: impl Into<String>,
        options: AnalyzerOptions,
    ) -> Self {
        let benchmark_symbol = benchmark_symbol.into();
        let benchmark = match provider.benchmark_history(&benchmark_symbol) {
            Ok(series) => {
                info!(
                    benchmark = %benchmark_symbol,
                    sessions = series.len(),
                    provider = provider.name(),
                    "benchmark loaded"
                );
                Some(Arc::new(series))
            }
            Err(e) => {
                warn!(benchmark = %benchmark_symbol, error = %e, "benchmark unavailable");
                None
            }
        };
        Self::with_benchmark(provider, benchmark_symbol, benchmark, options)
    }

    /// Create a session around an already loaded benchmark.
    pub fn with_benchmark(
        provider: Arc<dyn MarketDataProvider>,
        benchmark_symbol: impl Into<String>,
        benchmark: Option<Arc<BenchmarkSeries>>,
        options: AnalyzerOptions,
    ) -> Self {
        Self {
            provider,
            benchmark_symbol: benchmark_symbol.into(),
            benchmark,
            caution: CautionEvaluator::new(options.high_caution_threshold),
            options,
        }
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    pub fn benchmark_symbol(&self) -> &str {
        &self.benchmark_symbol
    }

    pub fn benchmark(&self) -> Option<&BenchmarkSeries> {
        self.benchmark.as_deref()
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    fn fetch(&self, symbol: &str) -> Result<PriceSeries, AnalysisError> {
        self.provider
            .history(symbol, self.options.history_period)
            .map_err(|source| AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                source,
            })
    }

    /// Fetch one symbol and score it under both rubrics.
    pub fn evaluate_leadership(&self, symbol: &str) -> Result<LeadershipEvaluation, AnalysisError> {
        let series = self.fetch(symbol)?;
        Ok(self.evaluate_series(&series))
    }

    /// Score an already loaded series.
    pub fn evaluate_series(&self, series: &PriceSeries) -> LeadershipEvaluation {
        let signals = compute_signals(series, self.benchmark(), self.options.macd.calculator());
        let leadership = LeadershipScore::from_signals(&signals);
        let canslim = CanslimScore::from_signals(&signals);

        debug!(
            symbol = series.symbol(),
            sessions = series.len(),
            leadership = leadership.raw_score,
            canslim_pct = canslim.overall_score_percent,
            unavailable = signals.unavailable().len(),
            "evaluated"
        );

        LeadershipEvaluation {
            symbol: series.symbol().to_string(),
            analysis_date: series.last_date(),
            current_price: series.last_close(),
            data_source: self.provider.source(),
            signals,
            leadership,
            canslim,
        }
    }

    /// Evaluate caution over a basket. Symbols without data are skipped and
    /// listed in the result; a basket with no usable symbol is an error.
    pub fn evaluate_caution(
        &self,
        symbols: &[String],
        sector: Option<&str>,
    ) -> Result<CautionResult, AnalysisError> {
        let mut basket = Vec::with_capacity(symbols.len());
        let mut unavailable = Vec::new();
        for symbol in symbols {
            match self.fetch(symbol) {
                Ok(series) => basket.push(series),
                Err(e) => {
                    debug!(%symbol, error = %e, "skipping symbol in caution basket");
                    unavailable.push(symbol.clone());
                }
            }
        }

        if basket.is_empty() {
            return Err(AnalysisError::NoUsableData {
                requested: symbols.len(),
                unavailable,
            });
        }

        let result = self.caution.evaluate(sector, &basket, unavailable);
        debug!(
            sector = sector.unwrap_or("-"),
            evaluated = result.evaluated_symbols.len(),
            caution_score = result.caution_score,
            "caution evaluated"
        );
        Ok(result)
    }
}
