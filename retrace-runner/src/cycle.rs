//! One scheduled cycle: fetch → scan → throttle → notify → record.
//!
//! [`Bot`] owns everything that persists between cycles (pacing state, the
//! sent-signal history). The analyzer itself stays stateless; a config reload
//! swaps it wholesale between cycles.

use crate::config::{BotConfig, BotConfigError, NotifierKind, ProviderConfig};
use crate::data::{
    CandleProvider, ChartQuery, CircuitBreaker, CsvProvider, DataError, FetchResult, SymbolMap,
    YahooProvider,
};
use crate::notify::{format_status, LogNotifier, Notifier, NotifyError, SignalHistory, StatusView};
use crate::scan::Scanner;
use crate::throttle::{Admission, SignalThrottle};
use chrono::{DateTime, Utc};
use retrace_core::fingerprint::ConfigHash;
use retrace_core::{AnalysisOutcome, Analyzer, Diagnostic, NoSignalReason, Signal};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] BotConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// What happened to one symbol in a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolStatus {
    /// Analyzed less than one interval ago.
    Paced,
    FetchFailed { error: String },
    NoSignal { reason: NoSignalReason },
    /// The analyzer proposed a signal but the rate limits held it back.
    Suppressed { signal: Signal, admission: String },
    Sent { signal: Signal },
    NotifyFailed { signal: Signal, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    #[serde(flatten)]
    pub status: SymbolStatus,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub config_hash: String,
    /// The whole cycle was skipped because `started_at` falls on an excluded weekday.
    pub excluded_day: bool,
    pub symbols: Vec<SymbolReport>,
}

impl CycleReport {
    pub fn sent(&self) -> impl Iterator<Item = &Signal> {
        self.symbols.iter().filter_map(|r| match &r.status {
            SymbolStatus::Sent { signal } => Some(signal),
            _ => None,
        })
    }
}

pub fn provider_from_config(
    config: &ProviderConfig,
) -> Result<Box<dyn CandleProvider>, DataError> {
    Ok(match config {
        ProviderConfig::Yahoo {
            interval,
            range,
            max_candles,
            base_url,
            symbol_map,
        } => Box::new(
            YahooProvider::new(
                Arc::new(CircuitBreaker::default_provider()),
                SymbolMap::default().merged(symbol_map),
                ChartQuery {
                    interval: interval.clone(),
                    range: range.clone(),
                },
                *max_candles,
            )?
            .with_base_url(base_url.as_str()),
        ),
        ProviderConfig::Csv { dir, max_candles } => {
            Box::new(CsvProvider::new(dir.clone(), *max_candles))
        }
    })
}

pub fn notifier_from_config(kind: NotifierKind) -> Result<Box<dyn Notifier>, NotifyError> {
    Ok(match kind {
        NotifierKind::Log => Box::new(LogNotifier),
        NotifierKind::Telegram => Box::new(crate::notify::TelegramNotifier::from_env()?),
    })
}

pub struct Bot {
    config: BotConfig,
    analyzer: Analyzer,
    config_hash: ConfigHash,
    provider: Box<dyn CandleProvider>,
    notifier: Box<dyn Notifier>,
    throttle: SignalThrottle,
    history: SignalHistory,
}

impl Bot {
    /// Build a bot with explicit provider and notifier. History is loaded
    /// from `config.history.storage_file` and seeds the rate limits.
    pub fn new(
        config: BotConfig,
        provider: Box<dyn CandleProvider>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, BotError> {
        config.validate()?;
        let analyzer = Analyzer::new(config.analyzer.clone()).map_err(BotConfigError::from)?;
        let config_hash = config.analyzer.fingerprint();
        let history =
            SignalHistory::load(&config.history.storage_file, config.history.max_stored_signals)?;
        let mut throttle = SignalThrottle::from_config(&config.schedule, &config.risk)?;
        throttle.seed_from(&history);
        info!(
            symbols = ?config.symbols,
            provider = provider.name(),
            notifier = notifier.name(),
            config_hash = config_hash.short(),
            stored_signals = history.len(),
            "bot ready"
        );
        Ok(Self {
            config,
            analyzer,
            config_hash,
            provider,
            notifier,
            throttle,
            history,
        })
    }

    pub fn from_config(config: BotConfig) -> Result<Self, BotError> {
        let provider = provider_from_config(&config.provider)?;
        let notifier = notifier_from_config(config.notifier)?;
        Self::new(config, provider, notifier)
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }

    pub fn config_hash(&self) -> &ConfigHash {
        &self.config_hash
    }

    /// Apply a new config between cycles. Pacing state and history survive;
    /// the provider or notifier is rebuilt only when its section changed.
    pub fn reload(&mut self, config: BotConfig) -> Result<(), BotError> {
        config.validate()?;
        let analyzer = Analyzer::new(config.analyzer.clone()).map_err(BotConfigError::from)?;
        let provider = (config.provider != self.config.provider)
            .then(|| provider_from_config(&config.provider))
            .transpose()?;
        let notifier = (config.notifier != self.config.notifier)
            .then(|| notifier_from_config(config.notifier))
            .transpose()?;

        // Nothing below can fail once validate() passed.
        self.throttle.reconfigure(&config.schedule, &config.risk)?;
        if let Some(provider) = provider {
            self.provider = provider;
        }
        if let Some(notifier) = notifier {
            self.notifier = notifier;
        }
        self.history.set_capacity(config.history.max_stored_signals);

        let hash = config.analyzer.fingerprint();
        if hash != self.config_hash {
            info!(from = self.config_hash.short(), to = hash.short(), "analyzer config changed");
        }
        self.analyzer = analyzer;
        self.config_hash = hash;
        self.config = config;
        Ok(())
    }

    pub fn status(&self) -> String {
        format_status(&StatusView {
            symbols: &self.config.symbols,
            interval_minutes: self.config.schedule.interval_minutes,
            last_signal: self.history.last_sent(),
        })
    }

    pub fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport {
            started_at: now,
            config_hash: self.config_hash.to_string(),
            excluded_day: false,
            symbols: Vec::with_capacity(self.config.symbols.len()),
        };

        if self.throttle.is_excluded_day(now) {
            info!(weekday = %now.format("%A"), "excluded day, skipping cycle");
            report.excluded_day = true;
            return report;
        }
        info!(config_hash = self.config_hash.short(), "cycle start");

        let mut fetched: Vec<FetchResult> = Vec::new();
        let mut early: Vec<SymbolReport> = Vec::new();
        for symbol in &self.config.symbols {
            if !self.throttle.should_analyze(symbol, now) {
                debug!(symbol = %symbol, "analyzed recently, skipping");
                early.push(SymbolReport {
                    symbol: symbol.clone(),
                    status: SymbolStatus::Paced,
                    diagnostics: Vec::new(),
                });
                continue;
            }
            match self.provider.fetch(symbol) {
                Ok(result) => fetched.push(result),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "fetch failed");
                    early.push(SymbolReport {
                        symbol: symbol.clone(),
                        status: SymbolStatus::FetchFailed {
                            error: e.to_string(),
                        },
                        diagnostics: Vec::new(),
                    });
                }
            }
        }

        let analyses = Scanner::new(&self.analyzer).scan(&fetched);
        let mut history_dirty = false;
        let mut analyzed: Vec<SymbolReport> = Vec::with_capacity(analyses.len());
        for item in analyses {
            self.throttle.mark_analyzed(&item.symbol, now);
            let status = match item.analysis.outcome {
                AnalysisOutcome::NoSignal(reason) => SymbolStatus::NoSignal { reason },
                AnalysisOutcome::Signal(signal) => {
                    let status = self.deliver(signal, now);
                    history_dirty |= matches!(status, SymbolStatus::Sent { .. });
                    status
                }
            };
            analyzed.push(SymbolReport {
                symbol: item.symbol,
                status,
                diagnostics: item.analysis.diagnostics,
            });
        }

        if history_dirty {
            if let Err(e) = self.history.save(&self.config.history.storage_file) {
                warn!(error = %e, "failed to persist signal history");
            }
        }

        // Report in configured symbol order.
        let mut by_symbol: Vec<SymbolReport> = early.into_iter().chain(analyzed).collect();
        for symbol in &self.config.symbols {
            if let Some(pos) = by_symbol.iter().position(|r| &r.symbol == symbol) {
                report.symbols.push(by_symbol.swap_remove(pos));
            }
        }
        info!(
            sent = report.sent().count(),
            symbols = report.symbols.len(),
            "cycle done"
        );
        report
    }

    fn deliver(&mut self, signal: Signal, now: DateTime<Utc>) -> SymbolStatus {
        match self.throttle.admit(&signal.symbol, now) {
            Admission::Allowed => {}
            held => {
                info!(symbol = %signal.symbol, admission = ?held, "signal suppressed");
                return SymbolStatus::Suppressed {
                    signal,
                    admission: format!("{held:?}"),
                };
            }
        }
        match self.notifier.notify(&signal) {
            Ok(()) => {
                self.throttle.record_sent(&signal.symbol, now);
                self.history.record(signal.clone(), now);
                SymbolStatus::Sent { signal }
            }
            Err(e) => {
                warn!(symbol = %signal.symbol, notifier = self.notifier.name(), error = %e, "notify failed");
                SymbolStatus::NotifyFailed {
                    signal,
                    error: e.to_string(),
                }
            }
        }
    }
}
