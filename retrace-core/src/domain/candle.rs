//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single symbol at a single timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Why a candle was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("{field} is not finite at {timestamp}")]
    NonFinite {
        field: &'static str,
        timestamp: DateTime<Utc>,
    },

    #[error("{field} is negative ({value}) at {timestamp}")]
    Negative {
        field: &'static str,
        value: f64,
        timestamp: DateTime<Utc>,
    },

    #[error("high {high} is below low {low} at {timestamp}")]
    HighBelowLow {
        high: f64,
        low: f64,
        timestamp: DateTime<Utc>,
    },
}

impl Candle {
    /// HLCC4: `(high + low + close + close) / 4`.
    pub fn weighted_price(&self) -> f64 {
        (self.high + self.low + self.close + self.close) / 4.0
    }

    /// Check that every numeric field is finite and non-negative and that
    /// `high >= low`.
    pub fn validate(&self) -> Result<(), CandleError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CandleError::NonFinite {
                    field,
                    timestamp: self.timestamp,
                });
            }
            if value < 0.0 {
                return Err(CandleError::Negative {
                    field,
                    value,
                    timestamp: self.timestamp,
                });
            }
        }
        if self.high < self.low {
            return Err(CandleError::HighBelowLow {
                high: self.high,
                low: self.low,
                timestamp: self.timestamp,
            });
        }
        Ok(())
    }
}
