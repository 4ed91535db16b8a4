//! Persisted screening snapshots and change detection between runs.

use std::collections::BTreeMap;

use canslim_core::domain::Market;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ranker::{MarketStats, RankedEntry, ScreeningFailure, ScreeningRun};

/// Current on-disk schema version. Newer versions are rejected on load.
pub const SCHEMA_VERSION: u32 = 1;

/// Score movement (in percentage points) that counts as a change.
pub const DEFAULT_SCORE_CHANGE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub id: String,
    pub created_at: NaiveDateTime,
    pub markets: Vec<Market>,
    pub min_score: f64,
    pub entries: Vec<RankedEntry>,
    #[serde(default)]
    pub failures: Vec<ScreeningFailure>,
    #[serde(default)]
    pub market_stats: BTreeMap<Market, MarketStats>,
}

impl Snapshot {
    pub fn from_run(run: &ScreeningRun) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id: run.id.clone(),
            created_at: run.completed_at,
            markets: run.markets.clone(),
            min_score: run.min_score,
            entries: run.entries.clone(),
            failures: run.failures.clone(),
            market_stats: run.market_stats.clone(),
        }
    }

    /// Compare against an older snapshot.
    pub fn diff_from(&self, previous: &Snapshot, threshold: f64) -> SnapshotDiff {
        diff_entries(&previous.entries, &self.entries, threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub symbol: String,
    pub market: Market,
    pub previous_score: f64,
    pub current_score: f64,
}

impl ScoreChange {
    pub fn delta(&self) -> f64 {
        self.current_score - self.previous_score
    }
}

/// Entries only in the new run, entries whose score moved by at least the
/// threshold, and entries only in the old run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub new_entries: Vec<RankedEntry>,
    pub score_changes: Vec<ScoreChange>,
    pub dropped_out: Vec<RankedEntry>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.new_entries.is_empty() && self.score_changes.is_empty() && self.dropped_out.is_empty()
    }
}

/// Diff two rankings keyed by `(market, symbol)`.
///
/// New entries and score changes follow the current ranking's order;
/// dropped entries follow the previous ranking's order.
pub fn diff_entries(
    previous: &[RankedEntry],
    current: &[RankedEntry],
    threshold: f64,
) -> SnapshotDiff {
    let key = |e: &RankedEntry| (e.market, e.symbol.clone());
    let before: BTreeMap<(Market, String), &RankedEntry> =
        previous.iter().map(|e| (key(e), e)).collect();
    let after: BTreeMap<(Market, String), &RankedEntry> =
        current.iter().map(|e| (key(e), e)).collect();

    let mut diff = SnapshotDiff::default();

    for entry in current {
        match before.get(&key(entry)) {
            None => diff.new_entries.push(entry.clone()),
            Some(old) => {
                let change = ScoreChange {
                    symbol: entry.symbol.clone(),
                    market: entry.market,
                    previous_score: old.overall_score(),
                    current_score: entry.overall_score(),
                };
                if change.delta().abs() >= threshold {
                    diff.score_changes.push(change);
                }
            }
        }
    }

    diff.dropped_out = previous
        .iter()
        .filter(|e| !after.contains_key(&key(e)))
        .cloned()
        .collect();

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::tests::entry;

    const HIGH: [f64; 7] = [1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0];
    const MID: [f64; 7] = [1.0, 1.0, 0.5, 1.0, 0.0, 0.0, 0.0];
    const MID_PLUS: [f64; 7] = [1.0, 1.0, 0.5, 1.0, 0.0, 0.0, 0.5];

    #[test]
    fn identical_rankings_have_no_diff() {
        let entries = vec![entry("A", Market::Kospi, HIGH), entry("B", Market::Kosdaq, MID)];
        assert!(diff_entries(&entries, &entries, 10.0).is_empty());
    }

    #[test]
    fn detects_new_changed_and_dropped() {
        let previous = vec![
            entry("KEEP", Market::Kospi, MID),
            entry("GONE", Market::Kospi, HIGH),
            entry("MOVED", Market::Nasdaq, MID),
        ];
        let current = vec![
            entry("MOVED", Market::Nasdaq, HIGH),
            entry("KEEP", Market::Kospi, MID),
            entry("FRESH", Market::Sp500, HIGH),
        ];

        let diff = diff_entries(&previous, &current, 10.0);
        assert_eq!(diff.new_entries.len(), 1);
        assert_eq!(diff.new_entries[0].symbol, "FRESH");
        assert_eq!(diff.dropped_out.len(), 1);
        assert_eq!(diff.dropped_out[0].symbol, "GONE");
        assert_eq!(diff.score_changes.len(), 1);
        assert_eq!(diff.score_changes[0].symbol, "MOVED");
        assert!(diff.score_changes[0].delta() > 0.0);
    }

    #[test]
    fn small_moves_are_not_changes() {
        // 0.5 / 7 * 100 = 7.14 points
        let previous = vec![entry("A", Market::Kospi, MID)];
        let current = vec![entry("A", Market::Kospi, MID_PLUS)];
        assert!(diff_entries(&previous, &current, 10.0).is_empty());
        assert_eq!(diff_entries(&previous, &current, 5.0).score_changes.len(), 1);
    }

    #[test]
    fn same_symbol_in_different_markets_is_distinct() {
        let previous = vec![entry("X", Market::Kospi, MID)];
        let current = vec![entry("X", Market::Kosdaq, MID)];
        let diff = diff_entries(&previous, &current, 10.0);
        assert_eq!(diff.new_entries.len(), 1);
        assert_eq!(diff.dropped_out.len(), 1);
    }
}
