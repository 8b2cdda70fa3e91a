//! Scheduled-cycle behavior with in-memory providers and notifiers.
//!
//! The NAS100 fixture is the support-retracement series from the core
//! scenarios: it produces a High-confidence BUY on every analysis, so pacing
//! and rate limits are the only things deciding whether a signal goes out.

use chrono::{DateTime, Duration, TimeZone, Utc};
use retrace_core::{AnalyzerConfig, Candle, Direction, NoSignalReason, Series, Signal};
use retrace_runner::data::DataSource;
use retrace_runner::{
    Bot, BotConfig, BotConfigError, BotError, CandleProvider, DataError, FetchResult,
    HistoryConfig, Notifier, NotifyError, SignalHistory, SymbolStatus,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn flat_series(closes: &[f64]) -> Series {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: base + Duration::hours(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect();
    Series::new(candles).unwrap()
}

fn support_retracement() -> Series {
    let mut closes: Vec<f64> = (0..200).map(|i| 60.0 + 0.2 * i as f64).collect();
    let cycle = [100.0, 100.05, 100.1, 100.1, 100.05];
    closes.extend((0..60).map(|i| cycle[i % 5]));
    *closes.last_mut().unwrap() = 100.10;
    flat_series(&closes)
}

struct FixtureProvider {
    series: HashMap<String, Series>,
}

impl FixtureProvider {
    fn stock() -> Self {
        let mut series = HashMap::new();
        series.insert("NAS100".to_string(), support_retracement());
        series.insert("GBPUSD".to_string(), flat_series(&[1.25; 50]));
        Self { series }
    }
}

impl CandleProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let series = self
            .series
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Signal>>>,
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn notify(&self, signal: &Signal) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(signal.clone());
        Ok(())
    }
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        "failing"
    }

    fn notify(&self, _signal: &Signal) -> Result<(), NotifyError> {
        Err(NotifyError::Http("connection reset".into()))
    }
}

fn bot_config(history_dir: &Path) -> BotConfig {
    BotConfig {
        symbols: vec!["NAS100".into(), "XAUUSD".into(), "GBPUSD".into()],
        analyzer: AnalyzerConfig {
            period: 10,
            shift: 5,
            trend_span: 200,
            zone_size_pct: 0.005,
            min_touch_points: 3,
            ..Default::default()
        },
        history: HistoryConfig {
            max_stored_signals: 100,
            storage_file: history_dir.join("signals.json"),
        },
        ..Default::default()
    }
}

// Wednesday.
fn wednesday(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

fn status_of<'a>(report: &'a retrace_runner::CycleReport, symbol: &str) -> &'a SymbolStatus {
    &report
        .symbols
        .iter()
        .find(|r| r.symbol == symbol)
        .unwrap_or_else(|| panic!("{symbol} missing from report"))
        .status
}

// ──────────────────────────────────────────────
// Cycles
// ──────────────────────────────────────────────

#[test]
fn first_cycle_sends_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(notifier.clone()),
    )
    .unwrap();

    let report = bot.run_cycle(wednesday(10, 0));
    assert!(!report.excluded_day);
    let order: Vec<&str> = report.symbols.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["NAS100", "XAUUSD", "GBPUSD"]);

    match status_of(&report, "NAS100") {
        SymbolStatus::Sent { signal } => assert_eq!(signal.direction, Direction::Buy),
        other => panic!("expected NAS100 to be sent, got {other:?}"),
    }
    assert!(matches!(
        status_of(&report, "XAUUSD"),
        SymbolStatus::FetchFailed { .. }
    ));
    assert!(matches!(
        status_of(&report, "GBPUSD"),
        SymbolStatus::NoSignal {
            reason: NoSignalReason::InsufficientData { actual: 50, .. }
        }
    ));

    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    assert_eq!(report.sent().count(), 1);
    assert_eq!(bot.history().last_sent(), Some(wednesday(10, 0)));

    let stored = SignalHistory::load(&dir.path().join("signals.json"), 100).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.iter().next().unwrap().signal.symbol, "NAS100");
}

#[test]
fn pacing_and_min_gap() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(notifier.clone()),
    )
    .unwrap();

    bot.run_cycle(wednesday(10, 0));

    let early = bot.run_cycle(wednesday(10, 5));
    assert_eq!(status_of(&early, "NAS100"), &SymbolStatus::Paced);
    assert_eq!(status_of(&early, "GBPUSD"), &SymbolStatus::Paced);
    // Failed fetches are retried on the next cycle.
    assert!(matches!(
        status_of(&early, "XAUUSD"),
        SymbolStatus::FetchFailed { .. }
    ));

    let next = bot.run_cycle(wednesday(10, 15));
    assert!(matches!(
        status_of(&next, "NAS100"),
        SymbolStatus::Suppressed { .. }
    ));
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);

    let hour_later = bot.run_cycle(wednesday(11, 0));
    assert!(matches!(
        status_of(&hour_later, "NAS100"),
        SymbolStatus::Sent { .. }
    ));
    assert_eq!(notifier.sent.lock().unwrap().len(), 2);
}

#[test]
fn daily_cap_holds_signals() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = bot_config(dir.path());
    config.risk.max_daily_signals = 2;
    config.risk.min_seconds_between_signals = 0;
    let notifier = RecordingNotifier::default();
    let mut bot = Bot::new(
        config,
        Box::new(FixtureProvider::stock()),
        Box::new(notifier.clone()),
    )
    .unwrap();

    for hour in 8..12 {
        bot.run_cycle(wednesday(hour, 0));
    }
    assert_eq!(notifier.sent.lock().unwrap().len(), 2);
}

#[test]
fn sunday_skips_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(notifier.clone()),
    )
    .unwrap();

    let sunday = Utc.with_ymd_and_hms(2024, 5, 5, 10, 0, 0).unwrap();
    let report = bot.run_cycle(sunday);
    assert!(report.excluded_day);
    assert!(report.symbols.is_empty());
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[test]
fn history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut bot = Bot::new(
            bot_config(dir.path()),
            Box::new(FixtureProvider::stock()),
            Box::new(RecordingNotifier::default()),
        )
        .unwrap();
        bot.run_cycle(wednesday(10, 0));
    }

    let notifier = RecordingNotifier::default();
    let mut restarted = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(notifier.clone()),
    )
    .unwrap();
    assert_eq!(restarted.history().len(), 1);
    assert!(restarted.status().contains(&wednesday(10, 0).to_rfc3339()));

    // Pacing is in-memory, the min-gap limit is not.
    let report = restarted.run_cycle(wednesday(10, 30));
    assert!(matches!(
        status_of(&report, "NAS100"),
        SymbolStatus::Suppressed { .. }
    ));
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[test]
fn notifier_failure_is_reported_not_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(FailingNotifier),
    )
    .unwrap();

    let report = bot.run_cycle(wednesday(10, 0));
    assert!(matches!(
        status_of(&report, "NAS100"),
        SymbolStatus::NotifyFailed { .. }
    ));
    assert!(bot.history().is_empty());
    assert!(!dir.path().join("signals.json").exists());
}

#[test]
fn reload_swaps_analyzer_between_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(notifier.clone()),
    )
    .unwrap();
    let before = bot.config_hash().clone();

    let mut next = bot_config(dir.path());
    next.symbols = vec!["NAS100".into()];
    // Retention long enough that NAS100 can no longer qualify.
    next.analyzer.shift = 100;
    bot.reload(next).unwrap();
    assert_ne!(bot.config_hash(), &before);

    let report = bot.run_cycle(wednesday(10, 0));
    assert_eq!(report.symbols.len(), 1);
    assert!(matches!(
        status_of(&report, "NAS100"),
        SymbolStatus::NoSignal {
            reason: NoSignalReason::InsufficientData { .. }
        }
    ));

    let mut invalid = bot_config(dir.path());
    invalid.analyzer.period = 0;
    assert!(bot.reload(invalid).is_err());
    assert_eq!(bot.config().symbols, vec!["NAS100"]);
}

#[test]
fn oversized_schedule_is_refused_at_startup_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut huge = bot_config(dir.path());
    huge.schedule.interval_minutes = i64::MAX as u64;
    let refused = Bot::new(
        huge.clone(),
        Box::new(FixtureProvider::stock()),
        Box::new(RecordingNotifier::default()),
    );
    assert!(matches!(
        refused,
        Err(BotError::Config(BotConfigError::IntervalTooLong(_)))
    ));

    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(RecordingNotifier::default()),
    )
    .unwrap();
    assert!(bot.reload(huge).is_err());
    let mut long_gap = bot_config(dir.path());
    long_gap.risk.min_seconds_between_signals = u64::MAX;
    assert!(matches!(
        bot.reload(long_gap),
        Err(BotError::Config(BotConfigError::SignalGapTooLong(_)))
    ));
    assert_eq!(bot.config().schedule.interval_minutes, 15);
}

#[test]
fn report_serializes_with_status_tags() {
    let dir = tempfile::tempdir().unwrap();
    let mut bot = Bot::new(
        bot_config(dir.path()),
        Box::new(FixtureProvider::stock()),
        Box::new(RecordingNotifier::default()),
    )
    .unwrap();
    let report = bot.run_cycle(wednesday(10, 0));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["symbols"][0]["symbol"], "NAS100");
    assert_eq!(json["symbols"][0]["status"], "sent");
    assert_eq!(json["symbols"][0]["signal"]["direction"], "BUY");
    assert_eq!(json["symbols"][1]["status"], "fetch_failed");
}
