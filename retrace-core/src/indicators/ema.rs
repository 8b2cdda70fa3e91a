//! Exponential Moving Average (EMA) and the lagged average built on it.
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (x[t] - EMA[t-1]), alpha = 2 / (span + 1).
//! Seed: EMA[0] = x[0] (no SMA warm-up window).
//! Lagged average: the EMA value computed through `t - shift`, reported at `t`.

/// EMA of `values` with the given span, defined at every index.
///
/// A span of zero yields an all-NaN series. NaN inputs propagate forward.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        // Written as prev + alpha * (x - prev) so a constant input stays exactly constant.
        let next = match prev {
            None => x,
            Some(p) => p + alpha * (x - p),
        };
        result.push(next);
        prev = Some(next);
    }
    result
}

/// Delay a series by `shift` bars: `out[t] = values[t - shift]`.
///
/// Indices with no source bar, and non-finite sources, are `None`.
pub fn shift_back(values: &[f64], shift: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            t.checked_sub(shift)
                .map(|src| values[src])
                .filter(|v| v.is_finite())
        })
        .collect()
}

/// Blank out every index before `first_valid`.
pub fn warmed_up(values: Vec<Option<f64>>, first_valid: usize) -> Vec<Option<f64>> {
    values
        .into_iter()
        .enumerate()
        .map(|(t, v)| if t < first_valid { None } else { v })
        .collect()
}

/// EMA over `values` with span `period`, delayed by `shift` bars.
///
/// Defined only for `t >= period + shift`: the first `period` EMA values are
/// treated as warm-up even though the recursion produces them.
pub fn lagged_average(values: &[f64], period: usize, shift: usize) -> Vec<Option<f64>> {
    warmed_up(shift_back(&ema(values, period), shift), period + shift)
}
