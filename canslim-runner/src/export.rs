//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! A screening run produces three write-once files sharing one timestamp:
//! - **JSON**: `screening_results_{ts}.json`, the full snapshot with a
//!   `schema_version`; newer versions are rejected on load
//! - **CSV**: `top_stocks_{ts}.csv`, the top-N ranking with letter scores
//! - **Markdown**: `screening_report_{ts}.md`, per-market summary and table
//!
//! Single-symbol analysis reports render to Markdown as well.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use canslim_core::analyzer::AnalysisReport;
use canslim_core::caution::CautionResult;
use canslim_core::signals::SignalSet;

use crate::snapshot::{Snapshot, SnapshotDiff, SCHEMA_VERSION};

const JSON_PREFIX: &str = "screening_results_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot to JSON")
}

/// Deserialize a snapshot, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_str(json).context("failed to deserialize snapshot from JSON")?;
    if snapshot.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            snapshot.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(snapshot)
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Newest snapshot in `dir`, by the timestamp in its file name.
///
/// Returns `Ok(None)` when the directory is missing or has no snapshots.
pub fn latest_snapshot(dir: &Path) -> Result<Option<(PathBuf, Snapshot)>> {
    if !dir.exists() {
        return Ok(None);
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(JSON_PREFIX) && n.ends_with(".json"))
        })
        .collect();
    candidates.sort();

    match candidates.pop() {
        Some(path) => {
            let snapshot = load_snapshot(&path)?;
            Ok(Some((path, snapshot)))
        }
        None => Ok(None),
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Top `top_n` entries with per-letter scores.
///
/// Columns: rank, symbol, market, overall_score, C, A, N, S, L, I, M,
/// leadership_score, grade
pub fn export_top_csv(snapshot: &Snapshot, top_n: usize) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "rank",
        "symbol",
        "market",
        "overall_score",
        "C",
        "A",
        "N",
        "S",
        "L",
        "I",
        "M",
        "leadership_score",
        "grade",
    ])?;

    for e in snapshot.entries.iter().take(top_n) {
        let [c, a, n, s, l, i, m] = e.canslim.letters();
        wtr.write_record([
            e.rank.to_string().as_str(),
            &e.symbol,
            e.market.as_str(),
            &format!("{:.1}", e.overall_score()),
            &c.to_string(),
            &a.to_string(),
            &n.to_string(),
            &s.to_string(),
            &l.to_string(),
            &i.to_string(),
            &m.to_string(),
            &format!("{}/{}", e.leadership.raw_score, e.leadership.max_score),
            e.leadership.grade.as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub markdown: PathBuf,
}

/// Write the JSON, CSV and Markdown artifacts for `snapshot` into
/// `output_dir`, creating it if needed.
pub fn save_artifacts(
    snapshot: &Snapshot,
    diff: Option<&SnapshotDiff>,
    output_dir: &Path,
    top_n_csv: usize,
    report_top: usize,
) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let ts = snapshot.created_at.format(TIMESTAMP_FORMAT).to_string();
    let paths = ArtifactPaths {
        json: output_dir.join(format!("{JSON_PREFIX}{ts}.json")),
        csv: output_dir.join(format!("top_stocks_{ts}.csv")),
        markdown: output_dir.join(format!("screening_report_{ts}.md")),
    };

    std::fs::write(&paths.json, export_json(snapshot)?)
        .with_context(|| format!("failed to write {}", paths.json.display()))?;
    std::fs::write(&paths.csv, export_top_csv(snapshot, top_n_csv)?)
        .with_context(|| format!("failed to write {}", paths.csv.display()))?;
    std::fs::write(&paths.markdown, render_screening_report(snapshot, diff, report_top))
        .with_context(|| format!("failed to write {}", paths.markdown.display()))?;

    Ok(paths)
}

// ─── Markdown reports ───────────────────────────────────────────────

pub fn render_screening_report(
    snapshot: &Snapshot,
    diff: Option<&SnapshotDiff>,
    top: usize,
) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# CANSLIM Screening Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Run | {} |", snapshot.id);
    let _ = writeln!(md, "| Completed | {} |", snapshot.created_at);
    let markets: Vec<&str> = snapshot.markets.iter().map(|m| m.as_str()).collect();
    let _ = writeln!(md, "| Markets | {} |", markets.join(", "));
    let _ = writeln!(md, "| Minimum Score | {:.1}% |", snapshot.min_score);
    let _ = writeln!(md, "| Qualified | {} |", snapshot.entries.len());
    let _ = writeln!(md, "| Failed | {} |", snapshot.failures.len());
    md.push('\n');

    md.push_str("## Markets\n\n");
    md.push_str("| Market | Screened | Qualified | Failed | Avg Score |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: |\n");
    for (market, stats) in &snapshot.market_stats {
        let avg = stats
            .average_score
            .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}%"));
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} |",
            market, stats.screened, stats.qualified, stats.failed, avg
        );
    }
    md.push('\n');

    let _ = writeln!(md, "## Top {}\n", top.min(snapshot.entries.len()));
    if snapshot.entries.is_empty() {
        md.push_str("No symbol cleared the minimum score.\n\n");
    } else {
        md.push_str("| Rank | Symbol | Market | Score | C | A | N | S | L | I | M | Grade |\n");
        md.push_str("| ---: | --- | --- | ---: | --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for e in snapshot.entries.iter().take(top) {
            let letters: Vec<String> = e.canslim.letters().iter().map(|v| v.to_string()).collect();
            let _ = writeln!(
                md,
                "| {} | {} | {} | {:.1}% | {} | {} |",
                e.rank,
                e.symbol,
                e.market,
                e.overall_score(),
                letters.join(" | "),
                e.leadership.grade
            );
        }
        md.push('\n');
    }

    if let Some(diff) = diff {
        md.push_str("## Changes Since Previous Run\n\n");
        if diff.is_empty() {
            md.push_str("No changes.\n\n");
        } else {
            for e in &diff.new_entries {
                let _ = writeln!(md, "- NEW {} ({}) {:.1}%", e.symbol, e.market, e.overall_score());
            }
            for c in &diff.score_changes {
                let _ = writeln!(
                    md,
                    "- CHANGED {} ({}) {:.1}% -> {:.1}% ({:+.1})",
                    c.symbol,
                    c.market,
                    c.previous_score,
                    c.current_score,
                    c.delta()
                );
            }
            for e in &diff.dropped_out {
                let _ = writeln!(md, "- DROPPED {} ({})", e.symbol, e.market);
            }
            md.push('\n');
        }
    }

    if !snapshot.failures.is_empty() {
        md.push_str("## Skipped Symbols\n\n");
        for f in &snapshot.failures {
            let _ = writeln!(md, "- {} ({}): {}", f.symbol, f.market, f.reason);
        }
        md.push('\n');
    }

    md
}

/// Markdown report for a single-symbol analysis.
pub fn render_analysis_report(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(2048);
    let rec = &report.recommendation;

    let _ = writeln!(md, "# Leadership Analysis: {}\n", report.symbol);
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Generated | {} |", report.generated_at);
    let _ = writeln!(md, "| Benchmark | {} |", report.benchmark_symbol);
    if let Some(eval) = &report.leadership {
        if let Some(date) = eval.analysis_date {
            let _ = writeln!(md, "| Analysis Date | {date} |");
        }
        if let Some(price) = eval.current_price {
            let _ = writeln!(md, "| Price | {price:.2} |");
        }
        let _ = writeln!(md, "| Data | {:?} |", eval.data_source);
    }
    md.push('\n');

    md.push_str("## Recommendation\n\n");
    let _ = writeln!(md, "**{}** (confidence {}%)\n", rec.action.label(), rec.confidence);
    let _ = writeln!(md, "{}\n", rec.reason);

    match &report.leadership {
        Some(eval) => {
            let l = &eval.leadership;
            let _ = writeln!(
                md,
                "## Leadership Score: {}/{} ({:.1}%, grade {})\n",
                l.raw_score, l.max_score, l.percentage, l.grade
            );
            md.push_str("| Criterion | Met |\n");
            md.push_str("| --- | --- |\n");
            let c = &l.criteria;
            for (name, met) in [
                ("Near 52-week high", c.near_52w_high),
                ("Outperforms market (6m)", c.outperforms_market),
                ("Above 20-week MA", c.above_ma),
                ("20-week MA rising", c.ma_trending_up),
                ("No MACD sell signal", c.no_macd_sell_signal),
                ("Strong up moves", c.strong_up_moves),
            ] {
                let _ = writeln!(md, "| {} | {} |", name, if met { "yes" } else { "no" });
            }
            md.push('\n');

            let _ = writeln!(
                md,
                "## CANSLIM: {:.1}%\n",
                eval.canslim.overall_score_percent
            );
            md.push_str("| C | A | N | S | L | I | M |\n");
            md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
            let letters: Vec<String> =
                eval.canslim.letters().iter().map(|v| v.to_string()).collect();
            let _ = writeln!(md, "| {} |\n", letters.join(" | "));

            render_signals(&mut md, &eval.signals);
        }
        None => {
            let _ = writeln!(
                md,
                "## Leadership Score\n\nUnavailable: {}\n",
                report.leadership_error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if let Some(caution) = &report.caution {
        render_caution(&mut md, caution);
    } else if let Some(err) = &report.caution_error {
        let _ = writeln!(md, "## Sector Caution\n\nUnavailable: {err}\n");
    }

    md
}

fn fmt_value(v: f64, suffix: &str) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else if v.is_infinite() {
        "inf".to_string()
    } else {
        format!("{v:.2}{suffix}")
    }
}

fn fmt_option(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.4}"))
}

fn render_signals(md: &mut String, s: &SignalSet) {
    md.push_str("## Signals\n\n");
    md.push_str("| Signal | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Distance from 52w high | {} |", fmt_value(s.distance_from_high_pct(), "%"));
    let _ = writeln!(md, "| Beta | {} |", fmt_value(s.beta(), ""));
    let _ = writeln!(md, "| Relative strength 3m | {} |", fmt_value(s.relative_strength_3m(), " pp"));
    let _ = writeln!(md, "| Relative strength 6m | {} |", fmt_value(s.relative_strength_6m(), " pp"));
    let _ = writeln!(md, "| 20-week MA slope | {} |", fmt_option(s.ma20w_slope()));
    let _ = writeln!(md, "| MACD | {} |", fmt_option(s.macd_current()));
    let _ = writeln!(md, "| MACD signal | {} |", fmt_option(s.macd_signal()));
    let _ = writeln!(md, "| MACD histogram | {} |", fmt_option(s.macd_histogram()));
    let _ = writeln!(
        md,
        "| Volatility (20d, annualized) | {} |",
        fmt_value(s.volatility_20d_annualized() * 100.0, "%")
    );
    let _ = writeln!(md, "| Up-day ratio | {} |", fmt_value(s.up_day_ratio(), ""));
    let _ = writeln!(md, "| Strength ratio | {} |", fmt_value(s.strength_ratio(), ""));
    md.push('\n');

    let unavailable = s.unavailable();
    if !unavailable.is_empty() {
        md.push_str("Unavailable signals:\n\n");
        for (name, err) in unavailable {
            let _ = writeln!(md, "- {name}: {err}");
        }
        md.push('\n');
    }
}

fn render_caution(md: &mut String, c: &CautionResult) {
    match &c.sector {
        Some(sector) => {
            let _ = writeln!(md, "## Sector Caution: {sector}\n");
        }
        None => md.push_str("## Sector Caution\n\n"),
    }
    let _ = writeln!(
        md,
        "Caution score {}{} over {} of {} symbols.\n",
        c.caution_score,
        if c.high_caution { " (HIGH)" } else { "" },
        c.evaluated_symbols.len(),
        c.symbol_count
    );
    md.push_str("| Warning | Active |\n");
    md.push_str("| --- | --- |\n");
    for (name, active) in [
        ("Laggard surge", c.laggard_surge_warning()),
        ("High valuation", c.high_valuation_warning()),
        ("Leverage risk", c.leverage_risk_warning()),
        ("Market heat", c.market_heat_warning()),
    ] {
        let _ = writeln!(md, "| {} | {} |", name, if active { "yes" } else { "no" });
    }
    md.push('\n');
    if !c.unavailable_symbols.is_empty() {
        let _ = writeln!(md, "Skipped: {}\n", c.unavailable_symbols.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::tests::entry;
    use canslim_core::domain::Market;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        Snapshot {
            schema_version: SCHEMA_VERSION,
            id: "20240628_093000-abc".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 6, 28)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            markets: vec![Market::Kospi],
            min_score: 30.0,
            entries: vec![
                entry("005930.KS", Market::Kospi, [1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0]),
                entry("000660.KS", Market::Kospi, [1.0, 1.0, 0.5, 0.0, 0.0, 0.0, 0.0]),
            ],
            failures: vec![],
            market_stats: BTreeMap::new(),
        }
    }

    #[test]
    fn csv_has_header_and_top_n_rows() {
        let csv = export_top_csv(&snapshot(), 1).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rank,symbol,market,overall_score,C,A,N"));
        assert!(lines[1].contains("005930.KS"));
        assert!(lines[1].contains("KOSPI"));
    }

    #[test]
    fn json_round_trip() {
        let snap = snapshot();
        let back = import_json(&export_json(&snap).unwrap()).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn newer_schema_rejected() {
        let mut snap = snapshot();
        snap.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&snap).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn report_lists_top_entries() {
        let md = render_screening_report(&snapshot(), None, 20);
        assert!(md.contains("# CANSLIM Screening Report"));
        assert!(md.contains("| 1 | 005930.KS | KOSPI |"));
        assert!(!md.contains("Changes Since Previous Run"));
    }

    #[test]
    fn value_formatting_marks_unavailable() {
        assert_eq!(fmt_value(f64::NAN, "%"), "n/a");
        assert_eq!(fmt_value(f64::INFINITY, ""), "inf");
        assert_eq!(fmt_value(1.234, "%"), "1.23%");
        assert_eq!(fmt_option(None), "n/a");
    }
}
