//! Batch screening over offline providers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use canslim_core::analyzer::{AnalyzerOptions, AnalyzerSession};
use canslim_core::data::{
    HistoryPeriod, InMemoryProvider, MarketDataProvider, StaticSymbolSource, SyntheticProvider,
    Universe,
};
use canslim_core::domain::Market;
use canslim_runner::{
    run_screening, run_screening_per_market, FailureKind, RankerConfig, ScreeningRun, Snapshot,
};
use chrono::NaiveDate;

fn end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

fn quick_config() -> RankerConfig {
    RankerConfig {
        min_score: 0.0,
        concurrency: 4,
        symbol_timeout: Duration::from_secs(10),
        request_delay: Duration::ZERO,
    }
}

fn synthetic_session() -> Arc<AnalyzerSession> {
    Arc::new(AnalyzerSession::new(
        Arc::new(SyntheticProvider::new(end())),
        "^KS11",
        AnalyzerOptions::default(),
    ))
}

fn universe(market: Market, symbols: &[&str]) -> Universe {
    let mut markets = BTreeMap::new();
    markets.insert(market, symbols.iter().map(|s| s.to_string()).collect());
    Universe {
        markets,
        sectors: BTreeMap::new(),
    }
}

/// In-memory provider seeded from synthetic histories.
fn seeded_provider(symbols: &[&str]) -> InMemoryProvider {
    let synthetic = SyntheticProvider::new(end());
    let mut provider = InMemoryProvider::new();
    for symbol in symbols.iter().chain(std::iter::once(&"^KS11")) {
        provider.insert(synthetic.history(symbol, HistoryPeriod::TwoYears).unwrap());
    }
    provider
}

fn symbols_of(run: &ScreeningRun) -> Vec<(Market, String)> {
    run.entries.iter().map(|e| (e.market, e.symbol.clone())).collect()
}

#[test]
fn ranking_is_sorted_and_ranked() {
    let run = run_screening(
        &synthetic_session(),
        &StaticSymbolSource,
        &[Market::Kospi, Market::Kosdaq],
        &quick_config(),
    );

    assert!(run.failures.is_empty());
    assert!(!run.entries.is_empty());
    for pair in run.entries.windows(2) {
        assert!(pair[0].overall_score() >= pair[1].overall_score());
    }
    for (i, entry) in run.entries.iter().enumerate() {
        assert_eq!(entry.rank, i + 1);
        assert!(entry.overall_score() > 0.0);
    }

    let kospi = &run.market_stats[&Market::Kospi];
    assert_eq!(kospi.screened, StaticSymbolSource::symbols(Market::Kospi).len());
    assert_eq!(kospi.evaluated, kospi.screened);
    assert_eq!(kospi.qualified, run.entries_for(Market::Kospi).count());
}

#[test]
fn repeated_runs_are_identical() {
    let session = synthetic_session();
    let markets = [Market::Kospi, Market::Sp500];
    let first = run_screening(&session, &StaticSymbolSource, &markets, &quick_config());

    let mut sequential = quick_config();
    sequential.concurrency = 1;
    let second = run_screening(&session, &StaticSymbolSource, &markets, &sequential);

    assert_eq!(first.entries, second.entries);
    assert_eq!(first.market_stats, second.market_stats);
}

#[test]
fn failing_symbol_is_skipped_not_fatal() {
    let symbols = ["AAA", "BBB", "CCC"];
    let provider = seeded_provider(&symbols).with_failure("BAD");
    let session = Arc::new(AnalyzerSession::new(
        Arc::new(provider),
        "^KS11",
        AnalyzerOptions::default(),
    ));
    let source = universe(Market::Nasdaq, &["AAA", "BAD", "BBB", "CCC"]);

    let run = run_screening(&session, &source, &[Market::Nasdaq], &quick_config());

    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].symbol, "BAD");
    assert_eq!(run.failures[0].kind, FailureKind::DataUnavailable);
    assert_eq!(run.market_stats[&Market::Nasdaq].evaluated, 3);
    assert!(run.entries.iter().all(|e| e.symbol != "BAD"));
}

#[test]
fn stalled_symbol_times_out() {
    let symbols = ["FAST", "SLOW"];
    let provider = seeded_provider(&symbols).with_delay("SLOW", Duration::from_secs(3));
    let session = Arc::new(AnalyzerSession::new(
        Arc::new(provider),
        "^KS11",
        AnalyzerOptions::default(),
    ));
    let source = universe(Market::Kospi, &symbols);
    let config = RankerConfig {
        symbol_timeout: Duration::from_millis(300),
        ..quick_config()
    };

    let run = run_screening(&session, &source, &[Market::Kospi], &config);

    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].symbol, "SLOW");
    assert_eq!(run.failures[0].kind, FailureKind::TimedOut);
    assert_eq!(symbols_of(&run), vec![(Market::Kospi, "FAST".to_string())]);
}

#[test]
fn floor_filters_everything_at_full_marks() {
    let config = RankerConfig {
        min_score: 100.0,
        ..quick_config()
    };
    let run = run_screening(&synthetic_session(), &StaticSymbolSource, &[Market::Kospi], &config);
    assert!(run.entries.is_empty());
    assert_eq!(run.market_stats[&Market::Kospi].average_score, None);
}

#[test]
fn per_market_sessions_use_their_own_benchmark() {
    let provider: Arc<dyn MarketDataProvider> = Arc::new(SyntheticProvider::new(end()));
    let mut sessions = BTreeMap::new();
    for market in [Market::Kospi, Market::Nasdaq] {
        sessions.insert(
            market,
            Arc::new(AnalyzerSession::new(
                Arc::clone(&provider),
                market.default_benchmark(),
                AnalyzerOptions::default(),
            )),
        );
    }

    // SP500 has no session and is skipped.
    let run = run_screening_per_market(
        &sessions,
        &StaticSymbolSource,
        &[Market::Kospi, Market::Nasdaq, Market::Sp500],
        &quick_config(),
    );
    assert_eq!(run.markets, vec![Market::Kospi, Market::Nasdaq]);
    assert!(!run.market_stats.contains_key(&Market::Sp500));
    assert_eq!(sessions[&Market::Nasdaq].benchmark_symbol(), "^IXIC");
}

#[test]
fn snapshot_of_same_run_has_empty_diff() {
    let run = run_screening(
        &synthetic_session(),
        &StaticSymbolSource,
        &[Market::Kospi],
        &quick_config(),
    );
    let snapshot = Snapshot::from_run(&run);
    assert_eq!(snapshot.id, run.id);
    assert!(snapshot.diff_from(&snapshot, 10.0).is_empty());
}
