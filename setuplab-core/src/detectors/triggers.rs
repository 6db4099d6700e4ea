//! Candlestick entry triggers on the lower timeframe.
//!
//! Bars `2..=n-2` are scanned. Each bar is first tested for an engulfing
//! pattern (bullish wins over bearish) and then, independently, for a
//! V-shape reversal, so a bar can yield two triggers.
//!
//! Scoring: `0.3 * volume / avg_volume + 0.4 * |close - open| / open + 0.3 * alignment`.
//! Alignment uses the RSI of the *latest* bar for every trigger, whatever the
//! trigger's own index.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::domain::{Bar, PriceSeries};
use crate::error::SignalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    BullishEngulfing,
    BearishEngulfing,
    VShape,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BullishEngulfing => "bullish_engulfing",
            Self::BearishEngulfing => "bearish_engulfing",
            Self::VShape => "v_shape",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub bar_index: usize,
    /// Close of the trigger bar.
    pub price: f64,
    pub strength: f64,
}

#[derive(Debug, Clone)]
pub struct TriggerDetector {
    v_shape_lookback: usize,
}

impl TriggerDetector {
    /// Smallest series with at least one scannable bar (index 2 with a bar after it).
    pub const MIN_BARS: usize = 4;

    pub fn new(v_shape_lookback: usize) -> Self {
        Self { v_shape_lookback }
    }

    pub fn v_shape_lookback(&self) -> usize {
        self.v_shape_lookback
    }

    /// All triggers in bar order, scored against `latest_rsi`.
    pub fn detect(
        &self,
        series: &PriceSeries,
        latest_rsi: f64,
    ) -> Result<Vec<Trigger>, SignalError> {
        let bars = series.bars();
        let n = bars.len();
        if n < Self::MIN_BARS {
            return Err(SignalError::short("trigger detection", Self::MIN_BARS, n));
        }
        let avg_volume = series.avg_volume().unwrap_or(0.0);

        let mut triggers = Vec::new();
        for i in 2..=n - 2 {
            let kinds = engulfing_at(bars, i)
                .into_iter()
                .chain(is_v_shape(bars, i, self.v_shape_lookback).then_some(TriggerKind::VShape));
            for kind in kinds {
                triggers.push(Trigger {
                    kind,
                    bar_index: i,
                    price: bars[i].close,
                    strength: trigger_strength(&bars[i], kind, avg_volume, latest_rsi)?,
                });
            }
        }

        debug!(
            timeframe = series.timeframe(),
            triggers = triggers.len(),
            latest_rsi,
            "triggers scanned"
        );
        Ok(triggers)
    }
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Engulfing pattern at `i` against bar `i - 1`. Bullish is checked first.
pub fn engulfing_at(bars: &[Bar], i: usize) -> Option<TriggerKind> {
    if i == 0 || i >= bars.len() {
        return None;
    }
    let (prev, bar) = (&bars[i - 1], &bars[i]);
    if bar.close > prev.open && bar.open < prev.close && bar.is_bullish() {
        Some(TriggerKind::BullishEngulfing)
    } else if bar.close < prev.open && bar.open > prev.close && bar.is_bearish() {
        Some(TriggerKind::BearishEngulfing)
    } else {
        None
    }
}

/// Dip and recovery over `[i - lookback, i]`: both ends close above the
/// bar at `i - lookback / 2`.
pub fn is_v_shape(bars: &[Bar], i: usize, lookback: usize) -> bool {
    if i < lookback || i >= bars.len() {
        return false;
    }
    let pivot = bars[i - lookback / 2].close;
    bars[i - lookback].close > pivot && bars[i].close > pivot
}

pub fn trigger_strength(
    bar: &Bar,
    kind: TriggerKind,
    avg_volume: f64,
    latest_rsi: f64,
) -> Result<f64, SignalError> {
    if avg_volume == 0.0 {
        return Err(SignalError::ZeroDenominator {
            what: "average volume",
        });
    }
    if bar.open == 0.0 {
        return Err(SignalError::ZeroDenominator { what: "bar open" });
    }
    let volume_score = bar.volume / avg_volume;
    let price_move = bar.body() / bar.open;
    let alignment = match kind {
        TriggerKind::BullishEngulfing if latest_rsi < 30.0 => 1.0,
        TriggerKind::BearishEngulfing if latest_rsi > 70.0 => 1.0,
        TriggerKind::VShape => 1.0,
        _ => 0.5,
    };

    Ok(0.3 * volume_score + 0.4 * price_move + 0.3 * alignment)
}
