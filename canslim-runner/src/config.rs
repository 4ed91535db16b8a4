//! Screening configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config and
//! CLI flags only need to override what they name.

use std::path::{Path, PathBuf};
use std::time::Duration;

use canslim_core::analyzer::{AnalyzerOptions, MacdStrategy, DEFAULT_BENCHMARK};
use canslim_core::caution::DEFAULT_HIGH_CAUTION_THRESHOLD;
use canslim_core::data::HistoryPeriod;
use canslim_core::domain::Market;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranker::RankerConfig;
use crate::snapshot::DEFAULT_SCORE_CHANGE_THRESHOLD;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub markets: Vec<Market>,
    /// Entries must score strictly above this CANSLIM percentage.
    pub min_score: f64,
    pub concurrency: usize,
    pub symbol_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub history_period: HistoryPeriod,
    pub benchmark: String,
    /// Score each market against its own index instead of `benchmark`.
    pub per_market_benchmark: bool,
    pub macd: MacdStrategy,
    pub high_caution_threshold: u8,
    pub top_n_csv: usize,
    pub report_top: usize,
    pub score_change_threshold: f64,
    pub output_dir: PathBuf,
    /// Optional TOML symbol universe; static lists are used otherwise.
    pub universe_file: Option<PathBuf>,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            markets: Market::ALL.to_vec(),
            min_score: 30.0,
            concurrency: 10,
            symbol_timeout_secs: 30,
            request_delay_ms: 200,
            history_period: HistoryPeriod::default(),
            benchmark: DEFAULT_BENCHMARK.to_string(),
            per_market_benchmark: false,
            macd: MacdStrategy::default(),
            high_caution_threshold: DEFAULT_HIGH_CAUTION_THRESHOLD,
            top_n_csv: 50,
            report_top: 20,
            score_change_threshold: DEFAULT_SCORE_CHANGE_THRESHOLD,
            output_dir: PathBuf::from("screening_results"),
            universe_file: None,
        }
    }
}

impl ScreeningConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.symbol_timeout_secs == 0 {
            return Err(ConfigError::Invalid("symbol_timeout_secs must be at least 1".into()));
        }
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(ConfigError::Invalid(format!(
                "min_score {} outside 0..=100",
                self.min_score
            )));
        }
        if self.markets.is_empty() {
            return Err(ConfigError::Invalid("no markets selected".into()));
        }
        Ok(())
    }

    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            history_period: self.history_period,
            macd: self.macd,
            high_caution_threshold: self.high_caution_threshold,
        }
    }

    pub fn ranker(&self) -> RankerConfig {
        RankerConfig {
            min_score: self.min_score,
            concurrency: self.concurrency,
            symbol_timeout: Duration::from_secs(self.symbol_timeout_secs),
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }

    /// Benchmark symbol used for `market`.
    pub fn benchmark_for(&self, market: Market) -> &str {
        if self.per_market_benchmark {
            market.default_benchmark()
        } else {
            &self.benchmark
        }
    }
}
