//! Touch-count validation of level candidates.

use crate::diagnostics::Diagnostic;
use crate::domain::{Level, LevelCandidate};

/// Number of prices within `zone` (relative to `level`) of the level.
///
/// `None` for a zero level, where relative distance is undefined.
pub fn touch_count(level: f64, prices: &[f64], zone: f64) -> Option<usize> {
    if level == 0.0 {
        return None;
    }
    Some(
        prices
            .iter()
            .filter(|&&p| ((p - level) / level).abs() <= zone)
            .count(),
    )
}

/// Validated levels plus the candidates skipped as degenerate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Validation {
    pub levels: Vec<Level>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Keep candidates touched at least `min_touch_points` times.
///
/// Candidates of the same kind at the same price collapse into one level;
/// the order of first detection is preserved.
pub fn validate(
    candidates: &[LevelCandidate],
    prices: &[f64],
    zone: f64,
    min_touch_points: usize,
) -> Validation {
    let mut out = Validation::default();
    for candidate in candidates {
        let Some(touches) = touch_count(candidate.price, prices, zone) else {
            out.diagnostics.push(Diagnostic::ZeroPriceLevel {
                bar_index: candidate.bar_index,
            });
            continue;
        };
        if touches < min_touch_points {
            continue;
        }
        let duplicate = out
            .levels
            .iter()
            .any(|l| l.kind == candidate.kind && l.price == candidate.price);
        if !duplicate {
            out.levels.push(Level {
                kind: candidate.kind,
                price: candidate.price,
                touch_count: touches,
            });
        }
    }
    out
}
