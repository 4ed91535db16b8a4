//! Batch ranker: scores every symbol of one or more markets on the CANSLIM
//! rubric, in parallel, and ranks the ones above the score floor.
//!
//! Per-symbol failures (missing data, stalled fetches) are recorded and
//! skipped. They never abort the batch and are never retried.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use canslim_core::analyzer::{AnalyzerSession, LeadershipEvaluation};
use canslim_core::data::SymbolSource;
use canslim_core::domain::Market;
use canslim_core::scoring::{CanslimScore, LeadershipScore};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Worker-pool and filtering knobs for one screening run.
#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    /// Entries must score strictly above this CANSLIM percentage.
    pub min_score: f64,
    pub concurrency: usize,
    pub symbol_timeout: Duration,
    /// Pause before each symbol's fetch, per worker.
    pub request_delay: Duration,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            min_score: 30.0,
            concurrency: 10,
            symbol_timeout: Duration::from_secs(30),
            request_delay: Duration::from_millis(200),
        }
    }
}

/// One qualifying symbol in a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position after sorting.
    pub rank: usize,
    pub symbol: String,
    pub market: Market,
    pub canslim: CanslimScore,
    pub leadership: LeadershipScore,
    pub analysis_date: Option<NaiveDate>,
    pub current_price: Option<f64>,
}

impl RankedEntry {
    pub fn from_evaluation(market: Market, eval: LeadershipEvaluation) -> Self {
        Self {
            rank: 0,
            symbol: eval.symbol,
            market,
            canslim: eval.canslim,
            leadership: eval.leadership,
            analysis_date: eval.analysis_date,
            current_price: eval.current_price,
        }
    }

    pub fn overall_score(&self) -> f64 {
        self.canslim.overall_score_percent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DataUnavailable,
    TimedOut,
    WorkerLost,
}

/// A symbol that produced no evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningFailure {
    pub symbol: String,
    pub market: Market,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub screened: usize,
    pub evaluated: usize,
    pub qualified: usize,
    pub failed: usize,
    /// Mean overall score of the qualifying entries.
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRun {
    pub id: String,
    pub started_at: NaiveDateTime,
    pub completed_at: NaiveDateTime,
    pub markets: Vec<Market>,
    pub min_score: f64,
    pub entries: Vec<RankedEntry>,
    pub failures: Vec<ScreeningFailure>,
    pub market_stats: BTreeMap<Market, MarketStats>,
}

impl ScreeningRun {
    pub fn entries_for(&self, market: Market) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter().filter(move |e| e.market == market)
    }
}

/// Screen `markets` with one shared analyzer session.
pub fn run_screening(
    session: &Arc<AnalyzerSession>,
    source: &dyn SymbolSource,
    markets: &[Market],
    config: &RankerConfig,
) -> ScreeningRun {
    let sessions: BTreeMap<Market, Arc<AnalyzerSession>> =
        markets.iter().map(|m| (*m, Arc::clone(session))).collect();
    run_screening_per_market(&sessions, source, markets, config)
}

/// Screen `markets`, scoring each against its own session's benchmark.
///
/// Markets without a session are skipped with a warning.
pub fn run_screening_per_market(
    sessions: &BTreeMap<Market, Arc<AnalyzerSession>>,
    source: &dyn SymbolSource,
    markets: &[Market],
    config: &RankerConfig,
) -> ScreeningRun {
    let started_at = Local::now().naive_local();

    let mut selected: Vec<Market> = Vec::with_capacity(markets.len());
    for market in markets {
        if selected.contains(market) {
            continue;
        }
        if sessions.contains_key(market) {
            selected.push(*market);
        } else {
            warn!(%market, "no analyzer session for market, skipping");
        }
    }

    // Basket iteration order: markets as given, symbols as listed.
    let jobs: Vec<(Market, String)> = selected
        .iter()
        .flat_map(|m| source.list_symbols(*m).into_iter().map(move |s| (*m, s)))
        .collect();

    info!(
        markets = ?selected,
        symbols = jobs.len(),
        concurrency = config.concurrency,
        min_score = config.min_score,
        "screening started"
    );

    let screen = |(market, symbol): &(Market, String)| {
        // `selected` only holds markets with a session.
        let session = &sessions[market];
        screen_symbol(session, *market, symbol, config)
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency.max(1))
        .thread_name(|i| format!("canslim-screen-{i}"))
        .build();
    let outcomes: Vec<Result<LeadershipEvaluation, ScreeningFailure>> = match pool {
        Ok(pool) => pool.install(|| jobs.par_iter().map(screen).collect()),
        Err(e) => {
            warn!(error = %e, "failed to build worker pool, screening sequentially");
            jobs.iter().map(screen).collect()
        }
    };

    let mut market_stats: BTreeMap<Market, MarketStats> =
        selected.iter().map(|m| (*m, MarketStats::default())).collect();
    let mut candidates = Vec::new();
    let mut failures = Vec::new();

    for ((market, _), outcome) in jobs.iter().zip(outcomes) {
        let stats = market_stats.entry(*market).or_default();
        stats.screened += 1;
        match outcome {
            Ok(eval) => {
                stats.evaluated += 1;
                candidates.push(RankedEntry::from_evaluation(*market, eval));
            }
            Err(failure) => {
                stats.failed += 1;
                failures.push(failure);
            }
        }
    }

    let entries = rank_entries(candidates, config.min_score);

    for (market, stats) in market_stats.iter_mut() {
        let scores: Vec<f64> = entries
            .iter()
            .filter(|e| e.market == *market)
            .map(RankedEntry::overall_score)
            .collect();
        stats.qualified = scores.len();
        stats.average_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
    }

    let completed_at = Local::now().naive_local();
    let id = run_id(started_at, &selected, &jobs, config.min_score);

    info!(
        run_id = %id,
        qualified = entries.len(),
        failed = failures.len(),
        elapsed_ms = (completed_at - started_at).num_milliseconds(),
        "screening completed"
    );

    ScreeningRun {
        id,
        started_at,
        completed_at,
        markets: selected,
        min_score: config.min_score,
        entries,
        failures,
        market_stats,
    }
}

/// Keep entries scoring strictly above `min_score`, sort by descending
/// overall score (ties keep input order) and assign 1-based ranks.
pub fn rank_entries(candidates: Vec<RankedEntry>, min_score: f64) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = candidates
        .into_iter()
        .filter(|e| e.overall_score() > min_score)
        .collect();
    entries.sort_by(|a, b| b.overall_score().total_cmp(&a.overall_score()));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

fn screen_symbol(
    session: &Arc<AnalyzerSession>,
    market: Market,
    symbol: &str,
    config: &RankerConfig,
) -> Result<LeadershipEvaluation, ScreeningFailure> {
    if !config.request_delay.is_zero() {
        thread::sleep(config.request_delay);
    }

    match evaluate_with_timeout(session, symbol, config.symbol_timeout) {
        Ok(eval) => {
            debug!(
                %market,
                %symbol,
                score = eval.canslim.overall_score_percent,
                "symbol scored"
            );
            Ok(eval)
        }
        Err((kind, reason)) => {
            warn!(%market, %symbol, ?kind, %reason, "symbol skipped");
            Err(ScreeningFailure {
                symbol: symbol.to_string(),
                market,
                kind,
                reason,
            })
        }
    }
}

/// Run the evaluation on a helper thread so a stalled fetch costs at most
/// `timeout`. A timed-out helper is left to finish on its own.
fn evaluate_with_timeout(
    session: &Arc<AnalyzerSession>,
    symbol: &str,
    timeout: Duration,
) -> Result<LeadershipEvaluation, (FailureKind, String)> {
    let (tx, rx) = mpsc::channel();
    let worker_session = Arc::clone(session);
    let worker_symbol = symbol.to_string();

    thread::Builder::new()
        .name("canslim-fetch".into())
        .spawn(move || {
            // The receiver is gone once the caller has timed out.
            let _ = tx.send(worker_session.evaluate_leadership(&worker_symbol));
        })
        .map_err(|e| (FailureKind::WorkerLost, format!("failed to spawn fetch thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(eval)) => Ok(eval),
        Ok(Err(e)) => Err((FailureKind::DataUnavailable, e.to_string())),
        Err(RecvTimeoutError::Timeout) => Err((
            FailureKind::TimedOut,
            format!("no result within {}s", timeout.as_secs_f64()),
        )),
        Err(RecvTimeoutError::Disconnected) => Err((
            FailureKind::WorkerLost,
            "fetch thread exited without a result".into(),
        )),
    }
}

fn run_id(
    started_at: NaiveDateTime,
    markets: &[Market],
    jobs: &[(Market, String)],
    min_score: f64,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(started_at.to_string().as_bytes());
    for market in markets {
        hasher.update(market.as_str().as_bytes());
    }
    for (market, symbol) in jobs {
        hasher.update(market.as_str().as_bytes());
        hasher.update(symbol.as_bytes());
    }
    hasher.update(&min_score.to_le_bytes());
    let hash = hasher.finalize().to_hex();
    format!("{}-{}", started_at.format("%Y%m%d_%H%M%S"), &hash[..12])
}
