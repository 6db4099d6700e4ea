//! Bar, the basic OHLCV record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a bar is rejected on load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar at {timestamp} has a NaN field")]
    Void { timestamp: NaiveDateTime },

    #[error("bar at {timestamp} has a non-positive price")]
    NonPositivePrice { timestamp: NaiveDateTime },

    #[error("bar at {timestamp} has negative volume {volume}")]
    NegativeVolume { timestamp: NaiveDateTime, volume: f64 },

    #[error("bar at {timestamp} has inconsistent OHLC (high {high}, low {low})")]
    InconsistentRange {
        timestamp: NaiveDateTime,
        high: f64,
        low: f64,
    },

    #[error("bar at {timestamp} is not after the previous bar at {previous}")]
    OutOfOrder {
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },
}

/// OHLCV bar for a single timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLCV field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }

    /// Like [`Bar::is_sane`], but says what is wrong.
    pub fn validate(&self) -> Result<(), BarError> {
        let timestamp = self.timestamp;
        if self.is_void() {
            return Err(BarError::Void { timestamp });
        }
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(BarError::NonPositivePrice { timestamp });
        }
        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                timestamp,
                volume: self.volume,
            });
        }
        let consistent = self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close;
        if !consistent {
            return Err(BarError::InconsistentRange {
                timestamp,
                high: self.high,
                low: self.low,
            });
        }
        Ok(())
    }

    /// Absolute candle body size.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
