//! Trend classification and the volatility-scaled bracket multiplier.

use crate::indicators::{ema, volatility_pct, warmed_up};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Uptrend,
    Downtrend,
    /// Latest close exactly equal to the trend average.
    Sideways,
}

/// Multiplier clamp for volatility-scaled symbols, in percent.
pub const VOLATILITY_CLAMP_PCT: (f64, f64) = (0.1, 0.5);

/// Unshifted EMA of closes with span `trend_span`, reported from `trend_span - 1`.
pub fn trend_average(closes: &[f64], trend_span: usize) -> Vec<Option<f64>> {
    let values = ema(closes, trend_span)
        .into_iter()
        .map(|v| Some(v).filter(|v| v.is_finite()))
        .collect();
    warmed_up(values, trend_span.saturating_sub(1))
}

pub fn classify(close: f64, trend_average: f64) -> Trend {
    if close > trend_average {
        Trend::Uptrend
    } else if close < trend_average {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

/// Where the bracket multiplier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierSource {
    Default,
    Volatility,
    /// Volatility scaling was requested but volatility was undefined.
    DefaultFallback,
}

/// Stop/target distance as a fraction of price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMultiplier {
    pub fraction: f64,
    pub source: MultiplierSource,
}

/// `default_pct / 100`, or `clamp(volatility, 0.1, 0.5) / 100` for scaled symbols.
pub fn risk_multiplier(volatility_pct: f64, volatility_scaled: bool, default_pct: f64) -> RiskMultiplier {
    if !volatility_scaled {
        return RiskMultiplier {
            fraction: default_pct / 100.0,
            source: MultiplierSource::Default,
        };
    }
    if !volatility_pct.is_finite() {
        return RiskMultiplier {
            fraction: default_pct / 100.0,
            source: MultiplierSource::DefaultFallback,
        };
    }
    let (lo, hi) = VOLATILITY_CLAMP_PCT;
    RiskMultiplier {
        fraction: volatility_pct.clamp(lo, hi) / 100.0,
        source: MultiplierSource::Volatility,
    }
}

/// Everything the generator needs to know about the trend at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendReading {
    pub trend: Trend,
    pub close: f64,
    pub trend_average: f64,
    pub volatility_pct: f64,
}

/// Classify the latest close. `None` when the latest trend average is undefined.
pub fn read_trend(closes: &[f64], averages: &[Option<f64>]) -> Option<TrendReading> {
    let close = *closes.last()?;
    let trend_average = (*averages.last()?)?;
    Some(TrendReading {
        trend: classify(close, trend_average),
        close,
        trend_average,
        volatility_pct: volatility_pct(closes),
    })
}
