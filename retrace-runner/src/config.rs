//! Bot configuration: which symbols, from where, how often, how many signals.
//!
//! Loaded from a single TOML file. Every section has defaults, so an empty file
//! yields the stock three-symbol bot polling Yahoo every 15 minutes.

use crate::data::{ChartQuery, DEFAULT_BASE_URL, DEFAULT_MAX_CANDLES};
use crate::notify::DEFAULT_MAX_STORED;
use chrono::Weekday;
use retrace_core::{AnalyzerConfig, ConfigError, SymbolOverride};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
/// One week.
pub const MAX_SIGNAL_GAP_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum BotConfigError {
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse bot config: {0}")]
    Parse(String),

    #[error("analyzer config: {0}")]
    Analyzer(#[from] ConfigError),

    #[error("no symbols configured")]
    NoSymbols,

    #[error("symbol {0} listed more than once")]
    DuplicateSymbol(String),

    #[error("unknown weekday {0:?} in schedule.exclude_days")]
    UnknownWeekday(String),

    #[error("schedule.interval_minutes must be > 0")]
    ZeroInterval,

    #[error("schedule.interval_minutes must be at most {MAX_INTERVAL_MINUTES}, got {0}")]
    IntervalTooLong(u64),

    #[error("risk.min_seconds_between_signals must be at most {MAX_SIGNAL_GAP_SECS}, got {0}")]
    SignalGapTooLong(u64),

    #[error("risk.max_daily_signals must be > 0")]
    ZeroDailySignals,

    #[error("history.max_stored_signals must be > 0")]
    ZeroHistory,

    #[error("provider.max_candles must be > 0")]
    ZeroRetention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_minutes: u64,
    /// Weekday names (`Sunday`, `sun`, ...) on which no cycle runs. UTC.
    pub exclude_days: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            exclude_days: vec!["Sunday".into()],
        }
    }
}

impl ScheduleConfig {
    pub fn excluded_weekdays(&self) -> Result<Vec<Weekday>, BotConfigError> {
        self.exclude_days
            .iter()
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| BotConfigError::UnknownWeekday(d.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Per symbol, per UTC day.
    pub max_daily_signals: usize,
    pub min_seconds_between_signals: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_daily_signals: 5,
            min_seconds_between_signals: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_stored_signals: usize,
    pub storage_file: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_stored_signals: DEFAULT_MAX_STORED,
            storage_file: PathBuf::from("signals.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    Yahoo {
        #[serde(default = "default_interval")]
        interval: String,
        #[serde(default = "default_range")]
        range: String,
        #[serde(default = "default_max_candles")]
        max_candles: usize,
        #[serde(default = "default_base_url")]
        base_url: String,
        /// Extra or replacement display → vendor ticker entries.
        #[serde(default)]
        symbol_map: BTreeMap<String, String>,
    },
    Csv {
        dir: PathBuf,
        #[serde(default = "default_max_candles")]
        max_candles: usize,
    },
}

fn default_interval() -> String {
    ChartQuery::default().interval
}

fn default_range() -> String {
    ChartQuery::default().range
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_candles() -> usize {
    DEFAULT_MAX_CANDLES
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::Yahoo {
            interval: default_interval(),
            range: default_range(),
            max_candles: DEFAULT_MAX_CANDLES,
            base_url: default_base_url(),
            symbol_map: BTreeMap::new(),
        }
    }
}

impl ProviderConfig {
    pub fn max_candles(&self) -> usize {
        match self {
            Self::Yahoo { max_candles, .. } | Self::Csv { max_candles, .. } => *max_candles,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    #[default]
    Log,
    Telegram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub symbols: Vec<String>,
    pub analyzer: AnalyzerConfig,
    pub schedule: ScheduleConfig,
    pub risk: RiskConfig,
    pub history: HistoryConfig,
    pub provider: ProviderConfig,
    pub notifier: NotifierKind,
}

impl Default for BotConfig {
    fn default() -> Self {
        let mut analyzer = AnalyzerConfig::default();
        analyzer.symbols.insert(
            "GBPUSD".into(),
            SymbolOverride {
                zone_size_pct: None,
                volatility_scaled: true,
            },
        );
        Self {
            symbols: vec!["NAS100".into(), "XAUUSD".into(), "GBPUSD".into()],
            analyzer,
            schedule: ScheduleConfig::default(),
            risk: RiskConfig::default(),
            history: HistoryConfig::default(),
            provider: ProviderConfig::default(),
            notifier: NotifierKind::default(),
        }
    }
}

impl BotConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, BotConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| BotConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, BotConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| BotConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), BotConfigError> {
        self.analyzer.validate()?;
        if self.symbols.is_empty() {
            return Err(BotConfigError::NoSymbols);
        }
        let mut seen = std::collections::BTreeSet::new();
        for s in &self.symbols {
            if !seen.insert(s.as_str()) {
                return Err(BotConfigError::DuplicateSymbol(s.clone()));
            }
        }
        self.schedule.excluded_weekdays()?;
        if self.schedule.interval_minutes == 0 {
            return Err(BotConfigError::ZeroInterval);
        }
        if self.schedule.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(BotConfigError::IntervalTooLong(self.schedule.interval_minutes));
        }
        if self.risk.max_daily_signals == 0 {
            return Err(BotConfigError::ZeroDailySignals);
        }
        if self.risk.min_seconds_between_signals > MAX_SIGNAL_GAP_SECS {
            return Err(BotConfigError::SignalGapTooLong(
                self.risk.min_seconds_between_signals,
            ));
        }
        if self.history.max_stored_signals == 0 {
            return Err(BotConfigError::ZeroHistory);
        }
        if self.provider.max_candles() == 0 {
            return Err(BotConfigError::ZeroRetention);
        }
        Ok(())
    }
}
