//! CANSLIM CLI: single-symbol analysis, sector caution, batch screening.
//!
//! Commands:
//! - `analyze`: leadership and CANSLIM scores plus a recommendation for one symbol
//! - `caution`: sector caution flags for a basket of symbols
//! - `screen`: rank every symbol of the selected markets and write artifacts
//! - `diff`: compare two saved screening snapshots
//! - `symbols`: list the symbols screened for a market

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use canslim_core::analyzer::{AnalyzerOptions, AnalyzerSession, MacdStrategy, DEFAULT_BENCHMARK};
use canslim_core::caution::CautionResult;
use canslim_core::data::{
    CircuitBreaker, HistoryPeriod, MarketDataProvider, StaticSymbolSource, SymbolSource,
    SyntheticProvider, Universe, YahooProvider,
};
use canslim_core::domain::Market;
use canslim_runner::{
    latest_snapshot, load_snapshot, render_analysis_report, run_screening,
    run_screening_per_market, save_artifacts, ScreeningConfig, ScreeningRun, Snapshot,
    SnapshotDiff,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Library modules whose debug output is connection noise.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

#[derive(Parser)]
#[command(
    name = "canslim",
    version,
    about = "CANSLIM leadership screener for KOSPI, KOSDAQ, NASDAQ and S&P 500"
)]
struct Cli {
    /// Base log level (trace, debug, info, warn, error). RUST_LOG overrides.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Use deterministic generated prices instead of Yahoo Finance.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one symbol and recommend an action.
    Analyze {
        symbol: String,

        /// Benchmark index symbol.
        #[arg(long, default_value = DEFAULT_BENCHMARK)]
        benchmark: String,

        /// History to fetch: 1y, 2y or 5y. Monthly MACD needs 5y.
        #[arg(long, default_value = "2y")]
        period: HistoryPeriod,

        /// MACD convention: ewm or seeded.
        #[arg(long, default_value = "ewm")]
        macd: MacdStrategy,

        /// Comma-separated sector basket for the caution check.
        #[arg(long, value_delimiter = ',')]
        sector_symbols: Vec<String>,

        /// Sector name to look up in --universe.
        #[arg(long)]
        sector: Option<String>,

        /// TOML universe file with `[sectors]` and `[markets]` tables.
        #[arg(long)]
        universe: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Evaluate sector caution warnings for a basket.
    Caution {
        /// Basket symbols. May be omitted when --sector and --universe are given.
        symbols: Vec<String>,

        #[arg(long)]
        sector: Option<String>,

        #[arg(long)]
        universe: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_BENCHMARK)]
        benchmark: String,

        #[arg(long, default_value = "2y")]
        period: HistoryPeriod,

        /// Caution score at which the basket is flagged high-caution.
        #[arg(long)]
        threshold: Option<u8>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Screen markets, rank by CANSLIM score and write artifacts.
    Screen {
        /// TOML screening config. Flags below override its fields.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Comma-separated markets (KOSPI, KOSDAQ, NASDAQ, SP500).
        #[arg(long, value_delimiter = ',')]
        markets: Vec<Market>,

        #[arg(long)]
        min_score: Option<f64>,

        #[arg(long)]
        concurrency: Option<usize>,

        #[arg(long)]
        timeout_secs: Option<u64>,

        #[arg(long)]
        delay_ms: Option<u64>,

        #[arg(long)]
        period: Option<HistoryPeriod>,

        #[arg(long)]
        macd: Option<MacdStrategy>,

        #[arg(long)]
        benchmark: Option<String>,

        /// Score each market against its own index.
        #[arg(long, default_value_t = false)]
        per_market_benchmark: bool,

        #[arg(long)]
        universe: Option<PathBuf>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip comparison with the previous snapshot.
        #[arg(long, default_value_t = false)]
        no_diff: bool,
    },
    /// Compare two screening snapshots.
    Diff {
        previous: PathBuf,
        current: PathBuf,

        /// Minimum score change, in percentage points.
        #[arg(long, default_value_t = canslim_runner::snapshot::DEFAULT_SCORE_CHANGE_THRESHOLD)]
        threshold: f64,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the symbols screened for a market.
    Symbols {
        market: Market,

        #[arg(long)]
        universe: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Analyze {
            symbol,
            benchmark,
            period,
            macd,
            sector_symbols,
            sector,
            universe,
            format,
            output,
        } => {
            let sector_symbols = resolve_basket(sector_symbols, sector.as_deref(), universe.as_deref())?;
            let options = AnalyzerOptions {
                history_period: period,
                macd,
                ..AnalyzerOptions::default()
            };
            let session = AnalyzerSession::new(build_provider(cli.synthetic)?, benchmark, options);
            let report = session.generate_report(
                &symbol,
                (!sector_symbols.is_empty()).then_some(sector_symbols.as_slice()),
            );
            let rendered = match format {
                OutputFormat::Markdown => render_analysis_report(&report),
                OutputFormat::Json => serde_json::to_string_pretty(&report)
                    .context("failed to serialize analysis report")?,
            };
            emit(&rendered, output.as_deref())
        }
        Commands::Caution {
            symbols,
            sector,
            universe,
            benchmark,
            period,
            threshold,
            json,
        } => {
            let basket = resolve_basket(symbols, sector.as_deref(), universe.as_deref())?;
            if basket.is_empty() {
                bail!("no symbols given: pass symbols or --sector with --universe");
            }
            let mut options = AnalyzerOptions {
                history_period: period,
                ..AnalyzerOptions::default()
            };
            if let Some(t) = threshold {
                options.high_caution_threshold = t;
            }
            let session = AnalyzerSession::new(build_provider(cli.synthetic)?, benchmark, options);
            let result = session
                .evaluate_caution(&basket, sector.as_deref())
                .context("caution evaluation failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_caution(&result);
            }
            Ok(())
        }
        Commands::Screen {
            config,
            markets,
            min_score,
            concurrency,
            timeout_secs,
            delay_ms,
            period,
            macd,
            benchmark,
            per_market_benchmark,
            universe,
            output_dir,
            no_diff,
        } => {
            let mut cfg = match &config {
                Some(path) => ScreeningConfig::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => ScreeningConfig::default(),
            };
            if !markets.is_empty() {
                cfg.markets = markets;
            }
            if let Some(v) = min_score {
                cfg.min_score = v;
            }
            if let Some(v) = concurrency {
                cfg.concurrency = v;
            }
            if let Some(v) = timeout_secs {
                cfg.symbol_timeout_secs = v;
            }
            if let Some(v) = delay_ms {
                cfg.request_delay_ms = v;
            }
            if let Some(v) = period {
                cfg.history_period = v;
            }
            if let Some(v) = macd {
                cfg.macd = v;
            }
            if let Some(v) = benchmark {
                cfg.benchmark = v;
            }
            if per_market_benchmark {
                cfg.per_market_benchmark = true;
            }
            if universe.is_some() {
                cfg.universe_file = universe;
            }
            if let Some(v) = output_dir {
                cfg.output_dir = v;
            }
            cfg.validate().context("invalid screening config")?;
            run_screen_cmd(&cfg, cli.synthetic, no_diff)
        }
        Commands::Diff {
            previous,
            current,
            threshold,
            json,
        } => {
            let before = load_snapshot(&previous)?;
            let after = load_snapshot(&current)?;
            let diff = after.diff_from(&before, threshold);
            if json {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            } else {
                print_diff(&diff);
            }
            Ok(())
        }
        Commands::Symbols { market, universe } => {
            let source = symbol_source(universe.as_deref())?;
            for symbol in source.list_symbols(market) {
                println!("{symbol}");
            }
            Ok(())
        }
    }
}

fn init_logging(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = String::from(log_level);
        for module in NOISY_MODULES {
            directives.push_str(&format!(",{module}=warn"));
        }
        EnvFilter::new(directives)
    });

    let subscriber = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr);
            let _ = subscriber.with(layer).try_init();
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = subscriber.with(layer).try_init();
        }
    }
}

fn build_provider(synthetic: bool) -> Result<Arc<dyn MarketDataProvider>> {
    if synthetic {
        warn!("synthetic mode: prices are generated, not market data");
        return Ok(Arc::new(SyntheticProvider::ending_today()));
    }
    let breaker = Arc::new(CircuitBreaker::default());
    let provider = YahooProvider::new(breaker).context("failed to build Yahoo Finance client")?;
    Ok(Arc::new(provider))
}

fn symbol_source(universe: Option<&Path>) -> Result<Box<dyn SymbolSource>> {
    match universe {
        Some(path) => {
            let universe = Universe::from_file(path)
                .with_context(|| format!("failed to load universe {}", path.display()))?;
            Ok(Box::new(universe))
        }
        None => Ok(Box::new(StaticSymbolSource)),
    }
}

/// Explicit symbols win; otherwise look the sector up in the universe.
fn resolve_basket(
    symbols: Vec<String>,
    sector: Option<&str>,
    universe: Option<&Path>,
) -> Result<Vec<String>> {
    if !symbols.is_empty() {
        return Ok(symbols);
    }
    match (sector, universe) {
        (Some(name), Some(path)) => {
            let universe = Universe::from_file(path)
                .with_context(|| format!("failed to load universe {}", path.display()))?;
            match universe.sector_symbols(name) {
                Some(list) => Ok(list.to_vec()),
                None => bail!(
                    "sector '{name}' not in {} (known: {})",
                    path.display(),
                    universe.sector_names().join(", ")
                ),
            }
        }
        (Some(_), None) => bail!("--sector needs --universe"),
        _ => Ok(Vec::new()),
    }
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn run_screen_cmd(cfg: &ScreeningConfig, synthetic: bool, no_diff: bool) -> Result<()> {
    let provider = build_provider(synthetic)?;
    let source = symbol_source(cfg.universe_file.as_deref())?;
    let ranker = cfg.ranker();

    let run = if cfg.per_market_benchmark {
        let sessions: BTreeMap<Market, Arc<AnalyzerSession>> = cfg
            .markets
            .iter()
            .map(|m| {
                let session = AnalyzerSession::new(
                    Arc::clone(&provider),
                    cfg.benchmark_for(*m),
                    cfg.analyzer_options(),
                );
                (*m, Arc::new(session))
            })
            .collect();
        run_screening_per_market(&sessions, source.as_ref(), &cfg.markets, &ranker)
    } else {
        let session = Arc::new(AnalyzerSession::new(
            provider,
            cfg.benchmark.clone(),
            cfg.analyzer_options(),
        ));
        run_screening(&session, source.as_ref(), &cfg.markets, &ranker)
    };

    let snapshot = Snapshot::from_run(&run);

    let previous = if no_diff {
        None
    } else {
        match latest_snapshot(&cfg.output_dir) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "ignoring unreadable previous snapshot");
                None
            }
        }
    };
    let diff = previous.as_ref().map(|(path, prev)| {
        info!(previous = %path.display(), "comparing with previous snapshot");
        snapshot.diff_from(prev, cfg.score_change_threshold)
    });

    let paths = save_artifacts(
        &snapshot,
        diff.as_ref(),
        &cfg.output_dir,
        cfg.top_n_csv,
        cfg.report_top,
    )?;

    print_run_summary(&run, cfg.report_top);
    if let Some(diff) = &diff {
        print_diff(diff);
    }
    println!("Snapshot: {}", paths.json.display());
    println!("CSV:      {}", paths.csv.display());
    println!("Report:   {}", paths.markdown.display());
    Ok(())
}

fn print_run_summary(run: &ScreeningRun, top: usize) {
    println!("=== Screening {} ===", run.id);
    for (market, stats) in &run.market_stats {
        println!(
            "{:<7} screened {:>4}  qualified {:>4}  failed {:>3}  avg {}",
            market.as_str(),
            stats.screened,
            stats.qualified,
            stats.failed,
            stats
                .average_score
                .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}%"))
        );
    }
    println!();
    for e in run.entries.iter().take(top) {
        println!(
            "{:>3}. {:<12} {:<7} {:>5.1}%  grade {}",
            e.rank,
            e.symbol,
            e.market.as_str(),
            e.overall_score(),
            e.leadership.grade
        );
    }
    if !run.failures.is_empty() {
        println!("\n{} symbols skipped (see log).", run.failures.len());
    }
    println!();
}

fn print_caution(result: &CautionResult) {
    if let Some(sector) = &result.sector {
        println!("=== Caution: {sector} ===");
    } else {
        println!("=== Caution ===");
    }
    println!(
        "Evaluated {} of {} symbols",
        result.evaluated_symbols.len(),
        result.symbol_count
    );
    for (name, active) in [
        ("Laggard surge", result.laggard_surge_warning()),
        ("High valuation", result.high_valuation_warning()),
        ("Leverage risk", result.leverage_risk_warning()),
        ("Market heat", result.market_heat_warning()),
    ] {
        println!("  {:<15} {}", name, if active { "WARNING" } else { "ok" });
    }
    println!(
        "Caution score: {}{}",
        result.caution_score,
        if result.high_caution { " (HIGH CAUTION)" } else { "" }
    );
    if !result.unavailable_symbols.is_empty() {
        println!("Skipped: {}", result.unavailable_symbols.join(", "));
    }
}

fn print_diff(diff: &SnapshotDiff) {
    if diff.is_empty() {
        println!("No changes since previous snapshot.");
        return;
    }
    for e in &diff.new_entries {
        println!("NEW      {:<12} {:<7} {:>5.1}%", e.symbol, e.market.as_str(), e.overall_score());
    }
    for c in &diff.score_changes {
        println!(
            "CHANGED  {:<12} {:<7} {:>5.1}% -> {:>5.1}% ({:+.1})",
            c.symbol,
            c.market.as_str(),
            c.previous_score,
            c.current_score,
            c.delta()
        );
    }
    for e in &diff.dropped_out {
        println!("DROPPED  {:<12} {:<7}", e.symbol, e.market.as_str());
    }
}
