//! Realized volatility of close-to-close returns.

/// Fractional change between consecutive values: `x[t] / x[t-1] - 1`.
///
/// Index 0 and any step from a zero or non-finite value are NaN.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t == 0 {
                return f64::NAN;
            }
            let prev = values[t - 1];
            if prev == 0.0 || !prev.is_finite() {
                f64::NAN
            } else {
                values[t] / prev - 1.0
            }
        })
        .collect()
}

/// Sample standard deviation (n - 1 denominator) of the finite values.
///
/// NaN when fewer than two finite values exist.
pub fn sample_stdev(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = finite.iter().sum::<f64>() / n as f64;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// `stdev(pct_change(closes)) * 100`, in percent.
pub fn volatility_pct(closes: &[f64]) -> f64 {
    sample_stdev(&pct_change(closes)) * 100.0
}
