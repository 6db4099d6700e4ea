//! Momentum state at the most recent lower-timeframe bar.
//!
//! The evaluator owns no indicator code; it asks the injected
//! `IndicatorLibrary` for full RSI, stochastic and momentum series and keeps
//! the last value of each. A NaN in any of them means the series has not
//! cleared warm-up, and the evaluator fails with `InsufficientHistory`
//! instead of handing back a partial snapshot.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StochasticParams;
use crate::domain::PriceSeries;
use crate::error::SignalError;
use crate::indicators::IndicatorLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumSnapshot {
    pub rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub momentum: f64,
}

impl MomentumSnapshot {
    pub fn is_oversold(&self) -> bool {
        self.rsi < 30.0
    }

    pub fn is_overbought(&self) -> bool {
        self.rsi > 70.0
    }
}

pub struct MomentumEvaluator<'a> {
    library: &'a dyn IndicatorLibrary,
    rsi_period: usize,
    lookback: usize,
    stochastic: StochasticParams,
}

impl<'a> MomentumEvaluator<'a> {
    pub fn new(library: &'a dyn IndicatorLibrary, rsi_period: usize, lookback: usize) -> Self {
        Self {
            library,
            rsi_period,
            lookback,
            stochastic: StochasticParams::default(),
        }
    }

    pub fn with_stochastic(mut self, stochastic: StochasticParams) -> Self {
        self.stochastic = stochastic;
        self
    }

    /// Bars needed before every component has a value at the last index.
    pub fn required_bars(&self) -> usize {
        let s = self.stochastic;
        (self.rsi_period + 1)
            .max(self.lookback + 1)
            .max(s.fastk + s.slowk + s.slowd - 2)
    }

    pub fn evaluate(&self, series: &PriceSeries) -> Result<MomentumSnapshot, SignalError> {
        let available = series.len();
        let insufficient = || SignalError::short("momentum warm-up", self.required_bars(), available);
        if available == 0 {
            return Err(insufficient());
        }

        let closes = series.closes();
        let s = self.stochastic;
        let rsi = self.library.rsi(&closes, self.rsi_period);
        let (stoch_k, stoch_d) = self.library.stochastic(
            &series.highs(),
            &series.lows(),
            &closes,
            s.fastk,
            s.slowk,
            s.slowd,
        );
        let momentum = self.library.momentum(&closes, self.lookback);

        let latest = |values: &[f64]| values.last().copied().filter(|v| !v.is_nan());
        let snapshot = MomentumSnapshot {
            rsi: latest(&rsi).ok_or_else(insufficient)?,
            stoch_k: latest(&stoch_k).ok_or_else(insufficient)?,
            stoch_d: latest(&stoch_d).ok_or_else(insufficient)?,
            momentum: latest(&momentum).ok_or_else(insufficient)?,
        };

        debug!(
            timeframe = series.timeframe(),
            rsi = snapshot.rsi,
            stoch_k = snapshot.stoch_k,
            stoch_d = snapshot.stoch_d,
            momentum = snapshot.momentum,
            "momentum snapshot"
        );
        Ok(snapshot)
    }
}
