//! Standalone indicator functions.
//!
//! Every function takes a slice and returns a new vector of the same length.
//! Missing history is `None` (or NaN for the plain `f64` helpers), never zero.
//! No value at index `t` depends on data after `t`.

pub mod ema;
pub mod volatility;
pub mod weighted;

pub use ema::{ema, lagged_average, shift_back, warmed_up};
pub use volatility::{pct_change, sample_stdev, volatility_pct};
pub use weighted::weighted_prices;

/// Create flat candles (open = high = low = close) from close prices for testing.
///
/// With a flat candle the weighted price equals the close, which keeps
/// expected values easy to reason about.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: base + chrono::Duration::minutes(15 * i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
