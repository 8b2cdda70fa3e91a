//! Signal: the trade proposal handed to a notifier.
//!
//! Signals are immutable once built. The confidence tier only records which
//! decision rule fired; it is not a probability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("BUY"),
            Self::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("High"),
            Self::Medium => f.write_str("Medium"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub confidence: ConfidenceTier,
    pub reason: String,
    /// Timestamp of the latest candle the signal was computed from.
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    /// Stop and target sit on opposite sides of the entry, in the direction
    /// implied by `direction`.
    pub fn has_consistent_bracket(&self) -> bool {
        match self.direction {
            Direction::Buy => self.stop_loss < self.entry_price && self.take_profit > self.entry_price,
            Direction::Sell => {
                self.stop_loss > self.entry_price && self.take_profit < self.entry_price
            }
        }
    }
}
