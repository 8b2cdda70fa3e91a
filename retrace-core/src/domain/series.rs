//! Series: an ordered, validated run of candles for one instrument.

use super::candle::{Candle, CandleError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Why a candle sequence could not become a `Series`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("candle {index}: {source}")]
    InvalidCandle {
        index: usize,
        #[source]
        source: CandleError,
    },

    #[error("candle {index} at {timestamp} is not after the previous candle at {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
}

/// Candles in strictly ascending timestamp order.
///
/// The only constructor is [`Series::new`], so every `Series` in the program
/// has already passed candle and ordering checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Series {
    candles: Vec<Candle>,
}

impl Series {
    pub fn new(candles: Vec<Candle>) -> Result<Self, SeriesError> {
        for (index, candle) in candles.iter().enumerate() {
            candle
                .validate()
                .map_err(|source| SeriesError::InvalidCandle { index, source })?;
            if index > 0 {
                let previous = candles[index - 1].timestamp;
                if candle.timestamp <= previous {
                    return Err(SeriesError::OutOfOrder {
                        index,
                        timestamp: candle.timestamp,
                        previous,
                    });
                }
            }
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}
