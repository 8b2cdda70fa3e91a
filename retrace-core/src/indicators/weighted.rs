//! HLCC4 weighted price.

use crate::domain::Candle;

/// `(high + low + close + close) / 4` for every candle.
pub fn weighted_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(Candle::weighted_price).collect()
}
