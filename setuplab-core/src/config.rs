//! Selector configuration.
//!
//! Fixed at construction time and never mutated afterwards. Loadable from
//! TOML; every field has a default, so an empty file is a valid config.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SignalError;

/// Slow stochastic periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochasticParams {
    pub fastk: usize,
    pub slowk: usize,
    pub slowd: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            fastk: 14,
            slowk: 3,
            slowd: 3,
        }
    }
}

/// How the protective stop is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopMode {
    /// Just beyond the nearest zone, or a fixed 2% when no zone qualifies.
    #[default]
    Zone,
    /// `multiplier` ATRs from entry.
    Atr { period: usize, multiplier: f64 },
}

const TIME_FORMAT: &str = "%H:%M";

/// Inclusive time-of-day window (`"HH:MM"`) in the clock of the bar timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingHours {
    pub start: String,
    pub end: String,
}

impl TradingHours {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parsed `(start, end)`; fails on malformed times or `start > end`.
    pub fn window(&self) -> Result<(NaiveTime, NaiveTime), SignalError> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| {
                SignalError::InvalidConfig(format!("trading hours: '{s}' is not HH:MM"))
            })
        };
        let (start, end) = (parse(&self.start)?, parse(&self.end)?);
        if start > end {
            return Err(SignalError::InvalidConfig(format!(
                "trading hours: start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok((start, end))
    }

    pub fn contains(&self, time: NaiveTime) -> Result<bool, SignalError> {
        let (start, end) = self.window()?;
        Ok(start <= time && time <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Minimum reward multiple of risk for the target.
    pub rr_ratio: f64,
    pub rsi_period: usize,
    /// Volume multiple of the series average a zone bar must exceed.
    pub volume_threshold: f64,
    /// Bars on each side a swing point must dominate.
    pub swing_window: usize,
    pub momentum_lookback: usize,
    pub v_shape_lookback: usize,
    pub stochastic: StochasticParams,
    /// Triggers at or below this strength are discarded.
    pub min_trigger_strength: f64,
    pub stop_mode: StopMode,
    /// Zone stops sit this fraction of the zone price beyond the zone.
    pub stop_buffer: f64,
    /// Also require %K < 20 for longs and %K > 80 for shorts.
    pub stochastic_confirmation: bool,
    /// Require the trigger bar's fair-value gap to exceed this.
    pub fvg_threshold: Option<f64>,
    /// Only trade while the latest lower-timeframe bar falls in this window.
    pub trading_hours: Option<TradingHours>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            rr_ratio: 2.0,
            rsi_period: 14,
            volume_threshold: 1.5,
            swing_window: 5,
            momentum_lookback: 14,
            v_shape_lookback: 5,
            stochastic: StochasticParams::default(),
            min_trigger_strength: 0.7,
            stop_mode: StopMode::Zone,
            stop_buffer: 0.005,
            stochastic_confirmation: false,
            fvg_threshold: None,
            trading_hours: None,
        }
    }
}

impl SelectorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, SignalError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignalError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), SignalError> {
        let invalid = |msg: &str| Err(SignalError::InvalidConfig(msg.to_string()));

        if !(self.rr_ratio.is_finite() && self.rr_ratio > 0.0) {
            return invalid("rr_ratio must be a positive number");
        }
        if !(self.volume_threshold.is_finite() && self.volume_threshold >= 0.0) {
            return invalid("volume_threshold must be a non-negative number");
        }
        if self.rsi_period == 0 || self.momentum_lookback == 0 {
            return invalid("rsi_period and momentum_lookback must be >= 1");
        }
        if self.swing_window == 0 {
            return invalid("swing_window must be >= 1");
        }
        if self.v_shape_lookback < 2 {
            return invalid("v_shape_lookback must be >= 2");
        }
        let s = self.stochastic;
        if s.fastk == 0 || s.slowk == 0 || s.slowd == 0 {
            return invalid("stochastic periods must be >= 1");
        }
        if !self.min_trigger_strength.is_finite() {
            return invalid("min_trigger_strength must be finite");
        }
        if let StopMode::Atr { period, multiplier } = self.stop_mode {
            if period == 0 {
                return invalid("ATR period must be >= 1");
            }
            if !(multiplier.is_finite() && multiplier > 0.0) {
                return invalid("ATR multiplier must be a positive number");
            }
        }
        if !(self.stop_buffer.is_finite() && (0.0..1.0).contains(&self.stop_buffer)) {
            return invalid("stop_buffer must be in [0, 1)");
        }
        if let Some(hours) = &self.trading_hours {
            hours.window()?;
        }
        if let Some(t) = self.fvg_threshold {
            if !(t.is_finite() && t >= 0.0) {
                return invalid("fvg_threshold must be a non-negative number");
            }
        }
        Ok(())
    }

    /// Content hash of the config, stable across runs.
    pub fn config_hash(&self) -> String {
        // Plain numbers, strings, bools and enums only: serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SelectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rr_ratio, 2.0);
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.volume_threshold, 1.5);
        assert_eq!(config.stop_mode, StopMode::Zone);
        assert_eq!(config.stop_buffer, 0.005);
        assert_eq!(config.trading_hours, None);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = SelectorConfig::from_toml_str("").unwrap();
        assert_eq!(config, SelectorConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = SelectorConfig::from_toml_str(
            r#"
rr_ratio = 3.0
stochastic_confirmation = true
fvg_threshold = 0.5

[stop_mode]
type = "atr"
period = 10
multiplier = 1.5
"#,
        )
        .unwrap();
        assert_eq!(config.rr_ratio, 3.0);
        assert!(config.stochastic_confirmation);
        assert_eq!(config.fvg_threshold, Some(0.5));
        assert_eq!(
            config.stop_mode,
            StopMode::Atr {
                period: 10,
                multiplier: 1.5
            }
        );
        assert_eq!(config.rsi_period, 14);
    }

    #[test]
    fn rejects_bad_values() {
        let config = SelectorConfig {
            rr_ratio: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SignalError::InvalidConfig(_))
        ));

        let config = SelectorConfig {
            swing_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(SelectorConfig::from_toml_str("rsi_period = 0").is_err());
    }

    #[test]
    fn stop_buffer_and_trading_hours_from_toml() {
        let config = SelectorConfig::from_toml_str(
            r#"
stop_buffer = 0.01

[trading_hours]
start = "08:00"
end = "22:00"
"#,
        )
        .unwrap();
        assert_eq!(config.stop_buffer, 0.01);
        let hours = config.trading_hours.unwrap();
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert!(hours.contains(t(8, 0)).unwrap());
        assert!(hours.contains(t(22, 0)).unwrap());
        assert!(!hours.contains(t(7, 59)).unwrap());
        assert!(!hours.contains(t(22, 1)).unwrap());
    }

    #[test]
    fn rejects_bad_stop_buffer_and_hours() {
        assert!(SelectorConfig::from_toml_str("stop_buffer = 1.0").is_err());
        assert!(SelectorConfig::from_toml_str("stop_buffer = -0.1").is_err());

        let inverted = SelectorConfig {
            trading_hours: Some(TradingHours::new("22:00", "08:00")),
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(SignalError::InvalidConfig(_))
        ));

        let garbled = SelectorConfig {
            trading_hours: Some(TradingHours::new("8am", "10:00")),
            ..Default::default()
        };
        assert!(garbled.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = SelectorConfig::from_toml_str("rr_ratio = \"two\"").unwrap_err();
        assert!(matches!(err, SignalError::ConfigParse(_)));
    }

    #[test]
    fn hash_is_stable_and_sensitive() {
        let a = SelectorConfig::default();
        let b = SelectorConfig::default();
        assert_eq!(a.config_hash(), b.config_hash());

        let c = SelectorConfig {
            rr_ratio: 2.5,
            ..Default::default()
        };
        assert_ne!(a.config_hash(), c.config_hash());
        assert_eq!(a.config_hash().len(), 64);
    }
}
