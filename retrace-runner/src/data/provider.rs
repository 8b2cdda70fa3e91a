//! Candle provider trait and structured error types.
//!
//! The CandleProvider trait abstracts over data sources (Yahoo Finance, CSV
//! files) so the scan loop can swap implementations and tests can mock them.

use retrace_core::domain::{Candle, Series, SeriesError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default retention window: most recent candles kept per symbol.
pub const DEFAULT_MAX_CANDLES: usize = 1000;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed row {row} in {path}: {reason}")]
    MalformedRow {
        path: String,
        row: usize,
        reason: String,
    },

    #[error("invalid series for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub series: Series,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
}

/// Trait for candle providers (Yahoo Finance, CSV files, test doubles).
///
/// Implementations own symbol translation, retries and retention. What they
/// hand back is already a validated, ascending [`Series`].
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the most recent candles for a display symbol.
    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Sort by timestamp, keep the last candle of any duplicated timestamp, cap to
/// `max_candles`, and validate.
pub fn into_series(
    symbol: &str,
    mut candles: Vec<Candle>,
    max_candles: usize,
) -> Result<Series, DataError> {
    // Stable sort keeps provider order among equal timestamps.
    candles.sort_by_key(|c| c.timestamp);
    let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match deduped.last_mut() {
            Some(last) if last.timestamp == candle.timestamp => *last = candle,
            _ => deduped.push(candle),
        }
    }
    let start = deduped.len().saturating_sub(max_candles);
    let kept = deduped.split_off(start);
    Series::new(kept).map_err(|source| DataError::InvalidSeries {
        symbol: symbol.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle(minute: i64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn sorts_and_dedups_keeping_latest_update() {
        let candles = vec![candle(30, 3.0), candle(0, 1.0), candle(15, 2.0), candle(30, 3.5)];
        let series = into_series("X", candles, 10).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.5]);
    }

    #[test]
    fn caps_to_retention_window() {
        let candles = (0..20).map(|i| candle(i, i as f64 + 1.0)).collect();
        let series = into_series("X", candles, 5).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.closes()[0], 16.0);
    }

    #[test]
    fn invalid_candle_is_reported_with_symbol() {
        let mut bad = candle(0, 1.0);
        bad.low = -1.0;
        let err = into_series("GBPUSD", vec![bad], 10).unwrap_err();
        assert!(matches!(err, DataError::InvalidSeries { ref symbol, .. } if symbol == "GBPUSD"));
    }
}
