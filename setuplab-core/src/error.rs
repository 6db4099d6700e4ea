//! Error type shared by the detectors, the selector, and config loading.
//!
//! Every failure is structural (bad or short input), never transient, so
//! nothing here is retried.

use thiserror::Error;

use crate::domain::BarError;

#[derive(Debug, Error)]
pub enum SignalError {
    /// The series is too short for a window, lookback, or indicator warm-up.
    #[error("insufficient history for {context}: need {needed} bars, have {available}")]
    InsufficientHistory {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    /// A score or ratio would divide by zero.
    #[error("zero denominator: {what}")]
    ZeroDenominator { what: &'static str },

    #[error("invalid direction '{0}' (expected 'long' or 'short')")]
    InvalidDirection(String),

    /// Stop coincides with entry, so risk/reward is undefined.
    #[error("degenerate risk: stop {stop} equals entry {entry}")]
    DegenerateRisk { entry: f64, stop: f64 },

    #[error("invalid bar: {0}")]
    Bar(#[from] BarError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignalError {
    pub(crate) fn short(context: &'static str, needed: usize, available: usize) -> Self {
        Self::InsufficientHistory {
            context,
            needed,
            available,
        }
    }
}
