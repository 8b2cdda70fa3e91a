//! Retrace Core: candles in, retracement signal (or a reason for none) out.
//!
//! This crate contains the pure analyzer:
//! - Domain types (candles, validated series, levels, signals)
//! - Analyzer configuration with fail-fast validation
//! - Indicators: HLCC4 weighted price, seeded EMA, lagged average, volatility
//! - Trend classification and the volatility-scaled bracket multiplier
//! - Support/resistance detection and touch validation
//! - The ordered retracement/continuation decision rules
//!
//! Nothing here performs I/O or holds state between calls.

pub mod analyzer;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod levels;
pub mod preprocess;
pub mod signal;
pub mod trend;

pub use analyzer::{Analysis, AnalysisOutcome, Analyzer, DerivedSeries, NoSignalReason};
pub use config::{AnalyzerConfig, ConfigError, SymbolOverride};
pub use diagnostics::Diagnostic;
pub use domain::{Candle, ConfidenceTier, Direction, Level, LevelKind, Series, Signal};
