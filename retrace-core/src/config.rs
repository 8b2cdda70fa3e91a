//! Analyzer configuration and its validation.
//!
//! The configuration is a plain value: built once, validated once by
//! [`AnalyzerConfig::validate`] (or [`crate::analyzer::Analyzer::new`]), then
//! shared by reference across every analysis in a batch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Invalid analyzer parameters. Raised before any analysis runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("period must be > 0")]
    ZeroPeriod,

    #[error("trend_span must be > 0")]
    ZeroTrendSpan,

    #[error("zone_size_pct must be in (0, 1), got {0}")]
    ZoneOutOfRange(f64),

    #[error("zone_size_pct override for {symbol} must be in (0, 1), got {value}")]
    SymbolZoneOutOfRange { symbol: String, value: f64 },

    #[error("min_touch_points must be >= 1")]
    ZeroTouchPoints,

    #[error("default_stop_take_ratio must be a positive number, got {0}")]
    InvalidStopTakeRatio(f64),

    #[error("risk_scaling_pct must be a positive number, got {0}")]
    InvalidRiskScaling(f64),

    #[error("failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Per-symbol adjustments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOverride {
    /// Retracement and touch zone for this symbol, replacing the global one.
    pub zone_size_pct: Option<f64>,
    /// Scale the stop/target multiplier with realized volatility (forex-style).
    pub volatility_scaled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// EMA span of the lagged average.
    pub period: usize,
    /// Bars the lagged average is delayed by.
    pub shift: usize,
    /// EMA span of the trend average.
    pub trend_span: usize,
    /// Relative tolerance used for touches and for the retracement zone.
    pub zone_size_pct: f64,
    pub min_touch_points: usize,
    /// Informational only; the generator derives brackets from the multiplier.
    pub default_stop_take_ratio: f64,
    /// Stop/target distance in percent for symbols without volatility scaling.
    pub risk_scaling_pct: f64,
    pub symbols: BTreeMap<String, SymbolOverride>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            period: 50,
            shift: 115,
            trend_span: 200,
            zone_size_pct: 0.002,
            min_touch_points: 3,
            default_stop_take_ratio: 1.5,
            risk_scaling_pct: 0.2,
            symbols: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.trend_span == 0 {
            return Err(ConfigError::ZeroTrendSpan);
        }
        if !zone_in_range(self.zone_size_pct) {
            return Err(ConfigError::ZoneOutOfRange(self.zone_size_pct));
        }
        if self.min_touch_points == 0 {
            return Err(ConfigError::ZeroTouchPoints);
        }
        if !(self.default_stop_take_ratio.is_finite() && self.default_stop_take_ratio > 0.0) {
            return Err(ConfigError::InvalidStopTakeRatio(self.default_stop_take_ratio));
        }
        if !(self.risk_scaling_pct.is_finite() && self.risk_scaling_pct > 0.0) {
            return Err(ConfigError::InvalidRiskScaling(self.risk_scaling_pct));
        }
        for (symbol, over) in &self.symbols {
            if let Some(value) = over.zone_size_pct {
                if !zone_in_range(value) {
                    return Err(ConfigError::SymbolZoneOutOfRange {
                        symbol: symbol.clone(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Shortest series the analyzer will look at.
    pub fn min_series_len(&self) -> usize {
        self.period.max(self.trend_span) + self.shift
    }

    pub fn zone_for(&self, symbol: &str) -> f64 {
        self.symbols
            .get(symbol)
            .and_then(|o| o.zone_size_pct)
            .unwrap_or(self.zone_size_pct)
    }

    pub fn is_volatility_scaled(&self, symbol: &str) -> bool {
        self.symbols
            .get(symbol)
            .is_some_and(|o| o.volatility_scaled)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

fn zone_in_range(value: f64) -> bool {
    value > 0.0 && value < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_series_len(), 315);
    }

    #[test]
    fn zero_period_rejected() {
        let config = AnalyzerConfig {
            period: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeriod));
    }

    #[test]
    fn zero_zone_rejected() {
        let config = AnalyzerConfig {
            zone_size_pct: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZoneOutOfRange(0.0)));
    }

    #[test]
    fn nan_zone_rejected() {
        let config = AnalyzerConfig {
            zone_size_pct: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZoneOutOfRange(_))
        ));
    }

    #[test]
    fn zero_touch_points_rejected() {
        let config = AnalyzerConfig {
            min_touch_points: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTouchPoints));
    }

    #[test]
    fn bad_symbol_override_rejected() {
        let mut config = AnalyzerConfig::default();
        config.symbols.insert(
            "GBPUSD".into(),
            SymbolOverride {
                zone_size_pct: Some(1.5),
                volatility_scaled: true,
            },
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SymbolZoneOutOfRange { .. })
        ));
    }

    #[test]
    fn symbol_override_lookup() {
        let mut config = AnalyzerConfig::default();
        config.symbols.insert(
            "GBPUSD".into(),
            SymbolOverride {
                zone_size_pct: Some(0.005),
                volatility_scaled: true,
            },
        );
        assert_eq!(config.zone_for("GBPUSD"), 0.005);
        assert_eq!(config.zone_for("NAS100"), 0.002);
        assert!(config.is_volatility_scaled("GBPUSD"));
        assert!(!config.is_volatility_scaled("NAS100"));
    }

    #[test]
    fn toml_with_partial_fields_uses_defaults() {
        let toml = r#"
            period = 20
            shift = 5

            [symbols.GBPUSD]
            volatility_scaled = true
        "#;
        let config = AnalyzerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.period, 20);
        assert_eq!(config.shift, 5);
        assert_eq!(config.trend_span, 200);
        assert!(config.is_volatility_scaled("GBPUSD"));
        assert_eq!(config.zone_for("GBPUSD"), 0.002);
    }

    #[test]
    fn toml_with_invalid_values_fails_validation() {
        let err = AnalyzerConfig::from_toml_str("min_touch_points = 0").unwrap_err();
        assert_eq!(err, ConfigError::ZeroTouchPoints);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AnalyzerConfig::from_toml_str("period = \"fifty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
