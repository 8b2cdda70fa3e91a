//! Non-fatal notes about degenerate inputs met during an analysis.
//!
//! Diagnostics travel next to the outcome, never inside it. None of them
//! stop an analysis; they explain why a candidate or a rule was skipped.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Level candidate at price zero; relative distance is undefined.
    ZeroPriceLevel { bar_index: usize },
    /// Latest close is zero; proximity to levels is undefined.
    ZeroClose,
    /// Volatility scaling requested but volatility was undefined.
    VolatilityUndefined,
    /// The generator built a bracket with stop and target on the same side.
    InconsistentBracket { stop_loss: f64, take_profit: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPriceLevel { bar_index } => {
                write!(f, "skipped zero-price level candidate at bar {bar_index}")
            }
            Self::ZeroClose => f.write_str("latest close is zero"),
            Self::VolatilityUndefined => {
                f.write_str("volatility undefined, using default multiplier")
            }
            Self::InconsistentBracket {
                stop_loss,
                take_profit,
            } => write!(
                f,
                "discarded bracket with stop {stop_loss} and target {take_profit} on the same side"
            ),
        }
    }
}
