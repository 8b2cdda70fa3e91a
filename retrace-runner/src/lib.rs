//! Retrace Runner: everything around the analyzer that touches the world.
//!
//! This crate builds on `retrace-core` to provide:
//! - Candle providers (Yahoo Finance chart API, per-symbol CSV files)
//! - Circuit breaker and retry policy for the network provider
//! - Alert formatting, sent-signal history, log and Telegram notifiers
//! - Per-symbol pacing and daily/min-gap signal limits
//! - Parallel multi-symbol scans and the scheduled cycle driver

pub mod config;
pub mod cycle;
pub mod data;
pub mod notify;
pub mod scan;
pub mod throttle;

pub use config::{
    BotConfig, BotConfigError, HistoryConfig, NotifierKind, ProviderConfig, RiskConfig,
    ScheduleConfig,
};
pub use cycle::{Bot, BotError, CycleReport, SymbolReport, SymbolStatus};
pub use data::{CandleProvider, CsvProvider, DataError, FetchResult, YahooProvider};
pub use notify::{LogNotifier, Notifier, NotifyError, SignalHistory, TelegramNotifier};
pub use scan::{Scanner, SymbolAnalysis};
pub use throttle::{Admission, SignalThrottle};
