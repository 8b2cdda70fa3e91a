//! Analyzer facade: series in, signal or reasoned no-signal out.
//!
//! `Analyzer` owns a validated [`AnalyzerConfig`]. Construction is the only
//! fallible step; [`Analyzer::analyze`] never fails and never panics, it
//! degrades every runtime anomaly to `NoSignal` plus diagnostics.

use crate::config::{AnalyzerConfig, ConfigError};
use crate::diagnostics::Diagnostic;
use crate::domain::{Series, Signal};
use crate::indicators::lagged_average;
use crate::levels;
use crate::preprocess::{prepare, InsufficientData};
use crate::signal::{generate, Snapshot};
use crate::trend::{read_trend, risk_multiplier, trend_average, MultiplierSource};
use serde::Serialize;
use tracing::{debug, info};

/// The series plus every per-bar derived value, for charting and inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries<'a> {
    pub series: &'a Series,
    pub weighted_price: Vec<f64>,
    pub lagged_average: Vec<Option<f64>>,
    pub trend_average: Vec<Option<f64>>,
}

impl DerivedSeries<'_> {
    pub fn latest_lagged_average(&self) -> Option<f64> {
        self.lagged_average.last().copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoSignalReason {
    InsufficientData { required: usize, actual: usize },
    /// Long enough, but the latest lagged or trend average is still undefined.
    IndicatorWarmup,
    /// No rule fired.
    NoSetup,
    /// A degenerate value (zero close, inconsistent bracket) stopped the decision.
    Degenerate,
}

impl From<InsufficientData> for NoSignalReason {
    fn from(e: InsufficientData) -> Self {
        Self::InsufficientData {
            required: e.required,
            actual: e.actual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Signal(Signal),
    NoSignal(NoSignalReason),
}

/// Result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub outcome: AnalysisOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    fn none(reason: NoSignalReason, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            outcome: AnalysisOutcome::NoSignal(reason),
            diagnostics,
        }
    }

    pub fn signal(&self) -> Option<&Signal> {
        match &self.outcome {
            AnalysisOutcome::Signal(s) => Some(s),
            AnalysisOutcome::NoSignal(_) => None,
        }
    }

    pub fn into_signal(self) -> Option<Signal> {
        match self.outcome {
            AnalysisOutcome::Signal(s) => Some(s),
            AnalysisOutcome::NoSignal(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Compute weighted price, lagged average and trend average for every bar.
    pub fn derive<'a>(&self, series: &'a Series) -> Result<DerivedSeries<'a>, InsufficientData> {
        let prepared = prepare(series, &self.config)?;
        let lagged = lagged_average(&prepared.weighted_price, self.config.period, self.config.shift);
        let trend = trend_average(&series.closes(), self.config.trend_span);
        Ok(DerivedSeries {
            series,
            weighted_price: prepared.weighted_price,
            lagged_average: lagged,
            trend_average: trend,
        })
    }

    pub fn analyze(&self, symbol: &str, series: &Series) -> Analysis {
        let mut diagnostics = Vec::new();

        let derived = match self.derive(series) {
            Ok(d) => d,
            Err(e) => {
                info!(symbol, required = e.required, actual = e.actual, "insufficient data");
                return Analysis::none(e.into(), diagnostics);
            }
        };

        let closes = series.closes();
        let (Some(lagged), Some(reading), Some(last)) = (
            derived.latest_lagged_average(),
            read_trend(&closes, &derived.trend_average),
            series.last(),
        ) else {
            info!(symbol, "indicators still warming up");
            return Analysis::none(NoSignalReason::IndicatorWarmup, diagnostics);
        };

        if reading.close == 0.0 {
            diagnostics.push(Diagnostic::ZeroClose);
            return Analysis::none(NoSignalReason::Degenerate, diagnostics);
        }

        let zone = self.config.zone_for(symbol);
        let candidates = levels::detect(&derived.weighted_price);
        let validation = levels::validate(
            &candidates,
            &derived.weighted_price,
            zone,
            self.config.min_touch_points,
        );
        diagnostics.extend(validation.diagnostics);

        let mult = risk_multiplier(
            reading.volatility_pct,
            self.config.is_volatility_scaled(symbol),
            self.config.risk_scaling_pct,
        );
        if mult.source == MultiplierSource::DefaultFallback {
            diagnostics.push(Diagnostic::VolatilityUndefined);
        }

        debug!(
            symbol,
            trend = ?reading.trend,
            close = reading.close,
            lagged_average = lagged,
            trend_average = reading.trend_average,
            volatility_pct = reading.volatility_pct,
            candidates = candidates.len(),
            levels = validation.levels.len(),
            mult = mult.fraction,
            "analysis inputs"
        );

        let snapshot = Snapshot {
            close: reading.close,
            lagged_average: lagged,
            trend_average: reading.trend_average,
            trend: reading.trend,
            levels: &validation.levels,
            zone,
            mult: mult.fraction,
        };

        let Some(proposal) = generate(&snapshot) else {
            info!(symbol, trend = ?reading.trend, "no setup");
            return Analysis::none(NoSignalReason::NoSetup, diagnostics);
        };

        let signal = Signal {
            symbol: symbol.to_string(),
            direction: proposal.direction,
            entry_price: proposal.entry_price,
            stop_loss: proposal.stop_loss,
            take_profit: proposal.take_profit,
            confidence: proposal.rule.confidence(),
            reason: proposal.rule.reason().to_string(),
            generated_at: last.timestamp,
        };

        if !signal.has_consistent_bracket() {
            diagnostics.push(Diagnostic::InconsistentBracket {
                stop_loss: signal.stop_loss,
                take_profit: signal.take_profit,
            });
            return Analysis::none(NoSignalReason::Degenerate, diagnostics);
        }

        info!(
            symbol,
            direction = %signal.direction,
            entry = signal.entry_price,
            stop = signal.stop_loss,
            target = signal.take_profit,
            rule = ?proposal.rule,
            "signal"
        );

        Analysis {
            outcome: AnalysisOutcome::Signal(signal),
            diagnostics,
        }
    }
}
