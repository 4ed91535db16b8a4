//! End-to-end analyzer runs over the offline providers.

use std::sync::Arc;

use canslim_core::analyzer::{AnalysisReport, AnalyzerOptions, AnalyzerSession, MacdStrategy};
use canslim_core::data::{HistoryPeriod, InMemoryProvider, MarketDataProvider, SyntheticProvider};
use canslim_core::domain::Market;
use canslim_core::data::{StaticSymbolSource, SymbolSource};
use canslim_core::recommendation::Action;
use chrono::NaiveDate;

fn synthetic() -> Arc<dyn MarketDataProvider> {
    Arc::new(SyntheticProvider::new(
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
    ))
}

#[test]
fn every_kospi_fallback_symbol_gets_a_report() {
    let session = AnalyzerSession::new(synthetic(), "^KS11", AnalyzerOptions::default());
    let symbols = StaticSymbolSource.list_symbols(Market::Kospi);

    for symbol in &symbols {
        let report = session.generate_report(symbol, Some(&symbols));
        assert!(report.is_complete(), "{symbol}: {report:?}");
        let eval = report.leadership.as_ref().unwrap();
        assert_eq!(report.recommendation.leadership_score, eval.leadership.raw_score);
        // Two years of history is too short for monthly MACD.
        assert!(!eval.signals.macd_available());
        assert_eq!(eval.canslim.m, 0.0);
    }
}

#[test]
fn five_year_history_enables_macd_under_both_strategies() {
    for macd in [MacdStrategy::Ewm, MacdStrategy::Seeded] {
        let options = AnalyzerOptions {
            history_period: HistoryPeriod::FiveYears,
            macd,
            ..AnalyzerOptions::default()
        };
        let session = AnalyzerSession::new(synthetic(), "^KS11", options);
        let eval = session.evaluate_leadership("NVDA").unwrap();
        assert!(eval.signals.macd_available(), "{macd}");
        assert!(eval.signals.macd_histogram().is_some());
    }
}

#[test]
fn report_survives_json_round_trip() {
    let session = AnalyzerSession::new(synthetic(), "^KS11", AnalyzerOptions::default());
    let report = session.generate_report("AAPL", Some(&["AAPL".into(), "MSFT".into()]));
    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[test]
fn computed_floats_reload_bit_identical() {
    let series = synthetic().history("005930.KS", HistoryPeriod::TwoYears).unwrap();
    let returns: Vec<f64> = series.daily_returns().into_iter().map(|(_, r)| r).collect();
    assert!(!returns.is_empty());

    let json = serde_json::to_string(&returns).unwrap();
    let back: Vec<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), returns.len());
    for (a, b) in returns.iter().zip(&back) {
        assert_eq!(a.to_bits(), b.to_bits(), "{a} reloaded as {b}");
    }
}

#[test]
fn session_is_shareable_across_threads() {
    let session = Arc::new(AnalyzerSession::new(
        synthetic(),
        "^KS11",
        AnalyzerOptions::default(),
    ));
    let handles: Vec<_> = ["AAPL", "MSFT", "NVDA", "AMZN"]
        .into_iter()
        .map(|symbol| {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.evaluate_leadership(symbol).map(|e| e.canslim))
        })
        .collect();

    for (handle, symbol) in handles.into_iter().zip(["AAPL", "MSFT", "NVDA", "AMZN"]) {
        let threaded = handle.join().unwrap().unwrap();
        let direct = session.evaluate_leadership(symbol).unwrap().canslim;
        assert_eq!(threaded, direct);
    }
}

#[test]
fn missing_data_yields_unavailable_recommendation() {
    let provider: Arc<dyn MarketDataProvider> = Arc::new(InMemoryProvider::new());
    let session = AnalyzerSession::new(provider, "^KS11", AnalyzerOptions::default());
    assert!(session.benchmark().is_none());
    let report = session.generate_report("005930.KS", None);
    assert_eq!(report.recommendation.action, Action::Unavailable);
    assert!(report.leadership_error.is_some());
}
