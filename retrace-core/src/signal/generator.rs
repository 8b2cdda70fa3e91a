//! Retracement decision logic.
//!
//! Rules are evaluated in a fixed order and the first one that fires wins:
//! 1. support retracement in an uptrend (BUY, high tier)
//! 2. resistance retracement in a downtrend (SELL, high tier)
//! 3. trend continuation above both averages (BUY, medium tier)
//!
//! Rules 1 and 2 need a validated level inside the retracement zone of the
//! latest close. Rule 3 does not look at levels at all.

use crate::domain::{ConfidenceTier, Direction, Level, LevelKind};
use crate::trend::Trend;
use serde::Serialize;

/// Stop discount applied to the lagged average.
pub const MA_STOP_OFFSET: f64 = 0.005;

/// Target distance in multiples of the bracket multiplier.
pub const TARGET_MULTIPLE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    SupportRetracement,
    ResistanceRetracement,
    TrendContinuation,
}

impl Rule {
    pub fn reason(self) -> &'static str {
        match self {
            Self::SupportRetracement => "retracement at support in uptrend",
            Self::ResistanceRetracement => "retracement at resistance in downtrend",
            Self::TrendContinuation => "trend continuation after pullback",
        }
    }

    pub fn confidence(self) -> ConfidenceTier {
        match self {
            Self::SupportRetracement | Self::ResistanceRetracement => ConfidenceTier::High,
            Self::TrendContinuation => ConfidenceTier::Medium,
        }
    }
}

/// Inputs to the decision, all taken at the latest bar.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub close: f64,
    pub lagged_average: f64,
    pub trend_average: f64,
    pub trend: Trend,
    pub levels: &'a [Level],
    /// Retracement zone, relative to the close.
    pub zone: f64,
    /// Bracket multiplier, a fraction of price.
    pub mult: f64,
}

/// A fired rule and its bracket, before symbol and time are attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proposal {
    pub rule: Rule,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// The validated level closest to `close` whose distance `|close - level| / close`
/// is within `zone`. Ties go to the level listed first.
pub fn nearest_level(close: f64, levels: &[Level], zone: f64) -> Option<&Level> {
    if close == 0.0 {
        return None;
    }
    let distance = |l: &Level| ((close - l.price) / close).abs();
    levels
        .iter()
        .filter(|l| distance(l) <= zone)
        .fold(None, |best: Option<&Level>, l| match best {
            Some(b) if distance(b) <= distance(l) => Some(b),
            _ => Some(l),
        })
}

pub fn generate(s: &Snapshot<'_>) -> Option<Proposal> {
    let nearest = nearest_level(s.close, s.levels, s.zone);

    if let Some(level) = nearest {
        if s.trend == Trend::Uptrend && level.kind == LevelKind::Support && s.close >= s.lagged_average {
            return Some(Proposal {
                rule: Rule::SupportRetracement,
                direction: Direction::Buy,
                entry_price: s.close,
                stop_loss: (level.price * (1.0 - s.mult))
                    .min(s.lagged_average * (1.0 - MA_STOP_OFFSET)),
                take_profit: s.close * (1.0 + s.mult * TARGET_MULTIPLE),
            });
        }
        if s.trend == Trend::Downtrend
            && level.kind == LevelKind::Resistance
            && s.close <= s.lagged_average
        {
            return Some(Proposal {
                rule: Rule::ResistanceRetracement,
                direction: Direction::Sell,
                entry_price: s.close,
                stop_loss: (level.price * (1.0 + s.mult))
                    .max(s.lagged_average * (1.0 + MA_STOP_OFFSET)),
                take_profit: s.close * (1.0 - s.mult * TARGET_MULTIPLE),
            });
        }
    }

    if s.trend == Trend::Uptrend && s.close > s.lagged_average && s.lagged_average > s.trend_average {
        return Some(Proposal {
            rule: Rule::TrendContinuation,
            direction: Direction::Buy,
            entry_price: s.close,
            stop_loss: s.lagged_average * (1.0 - MA_STOP_OFFSET),
            take_profit: s.close * (1.0 + s.mult * TARGET_MULTIPLE),
        });
    }

    None
}
