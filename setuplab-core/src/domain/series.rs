//! An immutable, chronologically ordered run of bars for one timeframe.

use std::sync::Arc;

use super::bar::{Bar, BarError};

/// Ordered OHLCV bars for a single timeframe, indexed `0..n` oldest first.
///
/// Bars are validated and ordering-checked on construction and never mutated
/// afterwards. Cloning is cheap: the bars are shared.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    timeframe: String,
    bars: Arc<[Bar]>,
}

impl PriceSeries {
    /// Build a series, rejecting insane bars and non-increasing timestamps.
    pub fn new(timeframe: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarError> {
        for bar in &bars {
            bar.validate()?;
        }
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(BarError::OutOfOrder {
                    timestamp: pair[1].timestamp,
                    previous: pair[0].timestamp,
                });
            }
        }
        Ok(Self {
            timeframe: timeframe.into(),
            bars: bars.into(),
        })
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Mean volume over the whole series, `None` when empty.
    pub fn avg_volume(&self) -> Option<f64> {
        if self.bars.is_empty() {
            return None;
        }
        let total: f64 = self.bars.iter().map(|b| b.volume).sum();
        Some(total / self.bars.len() as f64)
    }
}
