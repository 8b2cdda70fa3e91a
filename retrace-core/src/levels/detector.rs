//! Local extrema of the weighted price.
//!
//! A bar is a support candidate when its price is strictly below the two bars
//! on each side, a resistance candidate when strictly above them. The first
//! and last two bars never qualify. Equal neighbours disqualify a bar.

use crate::domain::{LevelCandidate, LevelKind};

/// Bars compared on each side of a candidate.
pub const WINDOW: usize = 2;

/// Scan `prices` for strict local extrema, in ascending bar order.
///
/// The same price may appear several times; the validator relies on that.
pub fn detect(prices: &[f64]) -> Vec<LevelCandidate> {
    prices
        .windows(2 * WINDOW + 1)
        .enumerate()
        .filter_map(|(start, w)| {
            let mid = w[WINDOW];
            let mut neighbours = w[..WINDOW].iter().chain(&w[WINDOW + 1..]);
            let kind = if neighbours.clone().all(|&p| mid < p) {
                LevelKind::Support
            } else if neighbours.all(|&p| mid > p) {
                LevelKind::Resistance
            } else {
                return None;
            };
            Some(LevelCandidate {
                kind,
                price: mid,
                bar_index: start + WINDOW,
            })
        })
        .collect()
}
