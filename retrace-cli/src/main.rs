//! Retrace CLI: analyze candles, scan symbols, and run the signal bot.
//!
//! Commands:
//! - `analyze`: analyze one CSV file and print (or export) the result
//! - `scan`: fetch every configured symbol and analyze them in parallel, no alerts
//! - `cycle`: run one scheduled cycle: fetch, analyze, throttle, notify
//! - `watch`: repeat cycles every `schedule.interval_minutes`, reloading the config
//! - `status`: configured symbols, interval and the last sent signal

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use retrace_core::{Analysis, AnalysisOutcome, Analyzer};
use retrace_runner::cycle::provider_from_config;
use retrace_runner::data::{into_series, read_candles};
use retrace_runner::notify::{format_status, StatusView};
use retrace_runner::{
    Bot, BotConfig, CandleProvider, CsvProvider, CycleReport, Scanner, SignalHistory,
    SymbolStatus,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "retrace_core=info,retrace_runner=info,retrace_cli=info";

#[derive(Parser)]
#[command(
    name = "retrace",
    about = "Retrace: lagged-average retracement signals for intraday candles"
)]
struct Cli {
    /// Bot config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single CSV file (timestamp,open,high,low,close,volume).
    Analyze {
        /// Path to the candle CSV.
        #[arg(long)]
        csv: PathBuf,

        /// Symbol the candles belong to (selects per-symbol overrides).
        #[arg(long)]
        symbol: String,

        /// Write derived series and the analysis as JSON to this path.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Analyze every configured symbol without sending alerts.
    Scan {
        /// Read `<SYMBOL>.csv` files from this directory instead of the configured provider.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Print the analyses as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run one cycle now.
    Cycle,
    /// Run cycles forever (or `--cycles` times), pausing one interval between them.
    Watch {
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Show what the bot monitors and when it last sent a signal.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            csv,
            symbol,
            export,
        } => run_analyze(config_path, &csv, &symbol, export.as_deref()),
        Commands::Scan { dir, json } => run_scan(config_path, dir, json),
        Commands::Cycle => run_cycle_once(config_path),
        Commands::Watch { cycles } => run_watch(config_path, cycles),
        Commands::Status => run_status(config_path),
    }
}

fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    match path {
        Some(p) => BotConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(BotConfig::default()),
    }
}

fn run_analyze(
    config_path: Option<&Path>,
    csv: &Path,
    symbol: &str,
    export: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let analyzer = Analyzer::new(config.analyzer.clone())?;
    let candles = read_candles(csv)?;
    let series = into_series(symbol, candles, config.provider.max_candles())?;
    let analysis = analyzer.analyze(symbol, &series);

    print_analysis(symbol, &analysis);

    if let Some(out) = export {
        let derived = analyzer.derive(&series).ok();
        let doc = serde_json::json!({
            "symbol": symbol,
            "config_hash": analyzer.config().fingerprint().to_string(),
            "derived": derived,
            "analysis": analysis,
        });
        std::fs::write(out, serde_json::to_string_pretty(&doc)?)
            .with_context(|| format!("writing {}", out.display()))?;
        println!("Exported to: {}", out.display());
    }
    Ok(())
}

fn run_scan(config_path: Option<&Path>, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let analyzer = Analyzer::new(config.analyzer.clone())?;
    let provider: Box<dyn CandleProvider> = match dir {
        Some(dir) => Box::new(CsvProvider::new(dir, config.provider.max_candles())),
        None => provider_from_config(&config.provider)?,
    };
    info!(
        provider = provider.name(),
        config_hash = analyzer.config().fingerprint().short(),
        "scan start"
    );

    let mut fetched = Vec::with_capacity(config.symbols.len());
    for symbol in &config.symbols {
        match provider.fetch(symbol) {
            Ok(f) => fetched.push(f),
            Err(e) => warn!(symbol = %symbol, error = %e, "fetch failed"),
        }
    }

    let results = Scanner::new(&analyzer).scan(&fetched);
    if json {
        let doc: Vec<_> = results
            .iter()
            .map(|r| serde_json::json!({ "symbol": r.symbol, "analysis": r.analysis }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for r in &results {
            print_analysis(&r.symbol, &r.analysis);
        }
    }
    Ok(())
}

fn run_cycle_once(config_path: Option<&Path>) -> Result<()> {
    let mut bot = Bot::from_config(load_config(config_path)?)?;
    let report = bot.run_cycle(Utc::now());
    print_report(&report);
    Ok(())
}

fn run_watch(config_path: Option<&Path>, cycles: Option<u64>) -> Result<()> {
    let mut bot = Bot::from_config(load_config(config_path)?)?;
    let mut done = 0u64;
    loop {
        let report = bot.run_cycle(Utc::now());
        print_report(&report);
        done += 1;
        if cycles.is_some_and(|n| done >= n) {
            return Ok(());
        }

        std::thread::sleep(Duration::from_secs(
            bot.config().schedule.interval_minutes.saturating_mul(60),
        ));

        // A broken edit keeps the last good config running.
        if let Some(path) = config_path {
            match BotConfig::load(path) {
                Ok(next) => {
                    if let Err(e) = bot.reload(next) {
                        warn!(error = %e, "config reload rejected, keeping previous config");
                    }
                }
                Err(e) => warn!(error = %e, "config reload failed, keeping previous config"),
            }
        }
    }
}

fn run_status(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let history = SignalHistory::load(
        &config.history.storage_file,
        config.history.max_stored_signals,
    )?;
    println!(
        "{}",
        format_status(&StatusView {
            symbols: &config.symbols,
            interval_minutes: config.schedule.interval_minutes,
            last_signal: history.last_sent(),
        })
    );
    println!("Stored signals: {}/{}", history.len(), history.capacity());
    Ok(())
}

fn print_analysis(symbol: &str, analysis: &Analysis) {
    match &analysis.outcome {
        AnalysisOutcome::Signal(s) => println!(
            "{symbol:<8} {:<4} entry {:<12} stop {:<12} target {:<12} {} ({})",
            s.direction.to_string(),
            s.entry_price,
            s.stop_loss,
            s.take_profit,
            s.confidence,
            s.reason
        ),
        AnalysisOutcome::NoSignal(reason) => println!("{symbol:<8} no signal: {reason:?}"),
    }
    for d in &analysis.diagnostics {
        println!("         note: {d}");
    }
}

fn print_report(report: &CycleReport) {
    if report.excluded_day {
        println!("{} excluded day, cycle skipped", report.started_at.to_rfc3339());
        return;
    }
    println!(
        "=== Cycle {} (config {}) ===",
        report.started_at.to_rfc3339(),
        &report.config_hash[..report.config_hash.len().min(12)]
    );
    for r in &report.symbols {
        let line = match &r.status {
            SymbolStatus::Paced => "analyzed recently".to_string(),
            SymbolStatus::FetchFailed { error } => format!("fetch failed: {error}"),
            SymbolStatus::NoSignal { reason } => format!("no signal: {reason:?}"),
            SymbolStatus::Suppressed { signal, admission } => {
                format!("{} held back ({admission})", signal.direction)
            }
            SymbolStatus::Sent { signal } => format!(
                "{} sent, entry {} stop {} target {}",
                signal.direction, signal.entry_price, signal.stop_loss, signal.take_profit
            ),
            SymbolStatus::NotifyFailed { signal, error } => {
                format!("{} not delivered: {error}", signal.direction)
            }
        };
        println!("{:<8} {line}", r.symbol);
    }
}
