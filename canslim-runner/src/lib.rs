//! CANSLIM Runner: batch screening across markets, snapshots and reports.
//!
//! This crate builds on `canslim-core` to provide:
//! - Screening configuration loaded from TOML
//! - A bounded-parallel batch ranker with per-symbol timeouts
//! - Snapshot persistence and run-to-run change detection
//! - JSON, CSV and Markdown artifact export

pub mod config;
pub mod export;
pub mod ranker;
pub mod snapshot;

pub use config::{ConfigError, ScreeningConfig};
pub use export::{
    latest_snapshot, load_snapshot, render_analysis_report, render_screening_report,
    save_artifacts, ArtifactPaths,
};
pub use ranker::{
    rank_entries, run_screening, run_screening_per_market, FailureKind, MarketStats,
    RankedEntry, RankerConfig, ScreeningFailure, ScreeningRun,
};
pub use snapshot::{diff_entries, ScoreChange, Snapshot, SnapshotDiff, SCHEMA_VERSION};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn screening_run_is_send_sync() {
        assert_send::<ScreeningRun>();
        assert_sync::<ScreeningRun>();
    }

    #[test]
    fn snapshot_is_send_sync() {
        assert_send::<Snapshot>();
        assert_sync::<Snapshot>();
    }

    #[test]
    fn ranker_config_is_send_sync() {
        assert_send::<RankerConfig>();
        assert_sync::<RankerConfig>();
    }
}
