//! Series preprocessing: minimum-length gate and weighted price.

use crate::config::AnalyzerConfig;
use crate::domain::Series;
use crate::indicators::weighted_prices;
use serde::Serialize;

/// The series is too short for the configured spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsufficientData {
    pub required: usize,
    pub actual: usize,
}

/// A series that passed the length gate, with its HLCC4 prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared<'a> {
    pub series: &'a Series,
    pub weighted_price: Vec<f64>,
}

/// Gate on `max(period, trend_span) + shift` candles, then compute weighted prices.
pub fn prepare<'a>(
    series: &'a Series,
    config: &AnalyzerConfig,
) -> Result<Prepared<'a>, InsufficientData> {
    let required = config.min_series_len();
    if series.len() < required {
        return Err(InsufficientData {
            required,
            actual: series.len(),
        });
    }
    Ok(Prepared {
        series,
        weighted_price: weighted_prices(series.candles()),
    })
}
