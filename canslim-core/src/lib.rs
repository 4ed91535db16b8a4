//! CANSLIM core: domain types, signal engine, scoring and policy.
//!
//! This crate holds everything needed to evaluate one symbol or one basket:
//! - Domain types (bars, price series, benchmark series, markets)
//! - Market data provider seam with Yahoo, in-memory and synthetic providers
//! - Signal engine (52-week high, beta, relative strength, moving-average
//!   trend, monthly MACD, volatility/strength)
//! - 6-point leadership and 7-point CANSLIM rubrics
//! - Basket caution evaluation and the recommendation policy
//! - The analyzer session tying them together

pub mod analyzer;
pub mod caution;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod recommendation;
pub mod scoring;
pub mod signals;

pub use analyzer::{
    AnalysisError, AnalysisReport, AnalyzerOptions, AnalyzerSession, LeadershipEvaluation,
    MacdStrategy, DEFAULT_BENCHMARK,
};
pub use caution::{CautionEvaluator, CautionResult};
pub use data::{DataError, HistoryPeriod, MarketDataProvider, SymbolSource};
pub use domain::{Bar, BenchmarkSeries, Market, PriceSeries};
pub use recommendation::{Action, Recommendation};
pub use scoring::{CanslimScore, Grade, LeadershipScore};
pub use signals::{SignalError, SignalSet};
