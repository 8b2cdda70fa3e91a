//! Domain types for Retrace

pub mod candle;
pub mod level;
pub mod series;
pub mod signal;

pub use candle::{Candle, CandleError};
pub use level::{Level, LevelCandidate, LevelKind};
pub use series::{Series, SeriesError};
pub use signal::{ConfidenceTier, Direction, Signal};
