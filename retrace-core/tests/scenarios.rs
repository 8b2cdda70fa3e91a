//! End-to-end analyzer scenarios on synthetic series.
//!
//! All candles are flat (open = high = low = close) so the weighted price
//! equals the close and every level and average can be reasoned about by hand.
//!
//! Scenarios:
//! A. BUY at a validated support in an uptrend
//! B. SELL at a validated resistance in a downtrend
//! C. sideways / no surviving levels → no signal
//! D. trend continuation with no level nearby → medium-tier BUY

use chrono::{Duration, TimeZone, Utc};
use retrace_core::{
    Analysis, AnalysisOutcome, Analyzer, AnalyzerConfig, Candle, ConfidenceTier, Direction,
    NoSignalReason, Series,
};

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

fn scenario_config() -> AnalyzerConfig {
    AnalyzerConfig {
        period: 10,
        shift: 5,
        trend_span: 200,
        zone_size_pct: 0.005,
        min_touch_points: 3,
        ..Default::default()
    }
}

/// 200-bar ramp followed by 60 bars repeating `cycle`, last close replaced.
fn ramp_then_cycle(start: f64, step: f64, cycle: [f64; 5], last_close: f64) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..200).map(|i| start + step * i as f64).collect();
    closes.extend((0..60).map(|i| cycle[i % 5]));
    *closes.last_mut().unwrap() = last_close;
    closes
}

fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "actual={actual}, expected={expected}"
    );
}

fn expect_signal(analysis: &Analysis) -> &retrace_core::Signal {
    analysis
        .signal()
        .unwrap_or_else(|| panic!("expected a signal, got {:?}", analysis.outcome))
}

// ──────────────────────────────────────────────
// Scenario A: BUY at support
// ──────────────────────────────────────────────

fn scenario_a() -> Series {
    // Ramp 60 → 99.8, then dips to 100.00 every fifth bar; all tail prices ≤ 100.10.
    flat_series(&ramp_then_cycle(
        60.0,
        0.2,
        [100.0, 100.05, 100.1, 100.1, 100.05],
        100.10,
    ))
}

#[test]
fn scenario_a_buy_at_support() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let series = scenario_a();
    assert_eq!(series.len(), 260);

    let analysis = analyzer.analyze("NAS100", &series);
    let signal = expect_signal(&analysis);

    assert_eq!(signal.direction, Direction::Buy);
    assert_eq!(signal.confidence, ConfidenceTier::High);
    assert!(signal.reason.contains("support"));
    assert_eq!(signal.entry_price, 100.10);

    let lagged = analyzer
        .derive(&series)
        .unwrap()
        .latest_lagged_average()
        .unwrap();
    assert!(lagged <= 100.10);
    let mult: f64 = 0.002;
    assert_approx(signal.stop_loss, (100.0 * (1.0 - mult)).min(lagged * 0.995), 1e-9);
    assert!(signal.stop_loss > 99.45 && signal.stop_loss < 99.6);
    assert_approx(signal.take_profit, 100.10 * (1.0 + 2.0 * mult), 1e-9);
    assert!(signal.has_consistent_bracket());
    assert_eq!(signal.generated_at, series.last().unwrap().timestamp);
}

// ──────────────────────────────────────────────
// Scenario B: SELL at resistance
// ──────────────────────────────────────────────

fn scenario_b() -> Series {
    // Ramp 140 → 100.2, then spikes to 100.00 every fifth bar; all tail prices ≥ 99.90.
    flat_series(&ramp_then_cycle(
        140.0,
        -0.2,
        [100.0, 99.95, 99.9, 99.9, 99.95],
        99.90,
    ))
}

#[test]
fn scenario_b_sell_at_resistance() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let series = scenario_b();

    let analysis = analyzer.analyze("NAS100", &series);
    let signal = expect_signal(&analysis);

    assert_eq!(signal.direction, Direction::Sell);
    assert_eq!(signal.confidence, ConfidenceTier::High);
    assert!(signal.reason.contains("resistance"));

    let lagged = analyzer
        .derive(&series)
        .unwrap()
        .latest_lagged_average()
        .unwrap();
    assert!(lagged >= 99.90);
    let mult: f64 = 0.002;
    assert_approx(signal.stop_loss, (100.0 * (1.0 + mult)).max(lagged * 1.005), 1e-9);
    assert!(signal.stop_loss > 100.4 && signal.stop_loss < 100.55);
    assert_approx(signal.take_profit, 99.90 * (1.0 - 2.0 * mult), 1e-9);
    assert!(signal.has_consistent_bracket());
}

// ──────────────────────────────────────────────
// Scenario C: sideways, no signal
// ──────────────────────────────────────────────

#[test]
fn scenario_c_flat_series_is_sideways_with_no_signal() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let series = flat_series(&[100.0; 260]);
    let analysis = analyzer.analyze("GBPUSD", &series);
    assert_eq!(
        analysis.outcome,
        AnalysisOutcome::NoSignal(NoSignalReason::NoSetup)
    );
}

#[test]
fn scenario_c_tight_oscillation_has_no_levels_and_no_signal() {
    // a, b, a, b ... never yields a strict extremum over a 2-bar window.
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let closes: Vec<f64> = (0..260)
        .map(|i| if i % 2 == 0 { 100.2 } else { 100.0 })
        .collect();
    let series = flat_series(&closes);
    let analysis = analyzer.analyze("GBPUSD", &series);
    assert_eq!(
        analysis.outcome,
        AnalysisOutcome::NoSignal(NoSignalReason::NoSetup)
    );
}

// ──────────────────────────────────────────────
// Scenario D: continuation
// ──────────────────────────────────────────────

#[test]
fn scenario_d_trend_continuation() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let closes: Vec<f64> = (0..260).map(|i| 50.0 + 0.25 * i as f64).collect();
    let series = flat_series(&closes);

    let analysis = analyzer.analyze("XAUUSD", &series);
    let signal = expect_signal(&analysis);

    assert_eq!(signal.direction, Direction::Buy);
    assert_eq!(signal.confidence, ConfidenceTier::Medium);
    assert_eq!(signal.reason, "trend continuation after pullback");

    let derived = analyzer.derive(&series).unwrap();
    let lagged = derived.latest_lagged_average().unwrap();
    let trend = derived.trend_average.last().copied().flatten().unwrap();
    assert!(signal.entry_price > lagged && lagged > trend);
    assert_approx(signal.stop_loss, lagged * 0.995, 1e-9);
    assert_approx(signal.take_profit, 114.75 * 1.004, 1e-9);

    let support = expect_signal(&analyzer.analyze("NAS100", &scenario_a())).reason.clone();
    assert_ne!(signal.reason, support);
}

// ──────────────────────────────────────────────
// Volatility scaling, length gate, determinism
// ──────────────────────────────────────────────

#[test]
fn volatility_scaled_symbol_uses_clamped_multiplier() {
    let mut config = scenario_config();
    config.symbols.insert(
        "GBPUSD".into(),
        retrace_core::SymbolOverride {
            zone_size_pct: None,
            volatility_scaled: true,
        },
    );
    let analyzer = Analyzer::new(config).unwrap();
    let closes: Vec<f64> = (0..260).map(|i| 50.0 + 0.25 * i as f64).collect();
    let series = flat_series(&closes);

    // Returns on a slow ramp barely vary (stdev under 0.1%), so the clamp floor applies.
    let signal = analyzer.analyze("GBPUSD", &series).into_signal().unwrap();
    assert_approx(signal.take_profit, 114.75 * (1.0 + 2.0 * 0.001), 1e-9);
}

#[test]
fn series_one_bar_short_yields_no_signal() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let closes: Vec<f64> = (0..204).map(|i| 50.0 + 0.25 * i as f64).collect();
    let analysis = analyzer.analyze("XAUUSD", &flat_series(&closes));
    assert_eq!(
        analysis.outcome,
        AnalysisOutcome::NoSignal(NoSignalReason::InsufficientData {
            required: 205,
            actual: 204
        })
    );
}

#[test]
fn identical_inputs_give_byte_identical_output() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let series = scenario_a();
    let first = serde_json::to_string(&analyzer.analyze("NAS100", &series)).unwrap();
    let second = serde_json::to_string(&analyzer.analyze("NAS100", &series)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn concurrent_analyses_share_one_analyzer() {
    let analyzer = Analyzer::new(scenario_config()).unwrap();
    let series = scenario_b();
    let expected = analyzer.analyze("NAS100", &series);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| analyzer.analyze("NAS100", &series)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
