//! Trade selection: composes the detectors into a single trade decision.
//!
//! Every call rescans both series from scratch; the selector holds no state
//! beyond its inputs and config, so `evaluate` is idempotent.
//!
//! Gating, in order:
//! 0. With trading hours configured, nothing is selected unless the latest
//!    lower-timeframe bar falls inside the window.
//! 1. Triggers with strength at or below `min_trigger_strength` are dropped
//!    (as are triggers failing the optional fair-value-gap filter).
//! 2. Remaining triggers are walked in bar order. Price above the trigger's
//!    close makes a long candidate, price below a short candidate, equality
//!    is skipped.
//! 3. A long needs RSI < 30 and a demand zone below price; a short needs
//!    RSI > 70 and a supply zone above price. With stochastic confirmation
//!    on, %K must also be below 20 / above 80.
//! 4. The first candidate that passes is priced (stop, target, risk/reward)
//!    and returned. No candidate means no trade.

pub mod risk;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{SelectorConfig, StopMode};
use crate::detectors::{
    FvgFilter, MarketStructure, MomentumEvaluator, MomentumSnapshot, StructureDetector, Trigger,
    TriggerDetector, ZoneDetector, ZoneSet,
};
use crate::domain::{Direction, PriceSeries, TradeDecision};
use crate::error::SignalError;
use crate::indicators::{IndicatorLibrary, NativeIndicators};

/// Everything the selector saw for one price, plus the decision.
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub current_price: f64,
    pub structure: MarketStructure,
    pub zones: ZoneSet,
    pub momentum: MomentumSnapshot,
    pub triggers: Vec<Trigger>,
    pub decision: Option<TradeDecision>,
}

/// One full scan of both timeframes.
struct Scan {
    structure: MarketStructure,
    zones: ZoneSet,
    momentum: MomentumSnapshot,
    triggers: Vec<Trigger>,
    atr: Option<f64>,
}

pub struct TradeSelector {
    htf: PriceSeries,
    ltf: PriceSeries,
    config: SelectorConfig,
    indicators: Box<dyn IndicatorLibrary>,
}

impl TradeSelector {
    /// Selector backed by the built-in indicators.
    pub fn new(
        htf: PriceSeries,
        ltf: PriceSeries,
        config: SelectorConfig,
    ) -> Result<Self, SignalError> {
        Self::with_indicators(htf, ltf, config, Box::new(NativeIndicators))
    }

    pub fn with_indicators(
        htf: PriceSeries,
        ltf: PriceSeries,
        config: SelectorConfig,
        indicators: Box<dyn IndicatorLibrary>,
    ) -> Result<Self, SignalError> {
        config.validate()?;
        Ok(Self {
            htf,
            ltf,
            config,
            indicators,
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn higher_timeframe(&self) -> &PriceSeries {
        &self.htf
    }

    pub fn lower_timeframe(&self) -> &PriceSeries {
        &self.ltf
    }

    /// BOS / CHOCH levels of the higher timeframe.
    pub fn structure(&self) -> MarketStructure {
        StructureDetector::new(self.config.swing_window).detect(&self.htf)
    }

    pub fn zones(&self) -> Result<ZoneSet, SignalError> {
        ZoneDetector::new(self.config.volume_threshold).detect(&self.ltf)
    }

    pub fn momentum(&self) -> Result<MomentumSnapshot, SignalError> {
        self.momentum_evaluator().evaluate(&self.ltf)
    }

    /// Triggers scored against the latest RSI.
    pub fn triggers(&self) -> Result<Vec<Trigger>, SignalError> {
        let momentum = self.momentum()?;
        self.trigger_detector().detect(&self.ltf, momentum.rsi)
    }

    /// Protective stop for a position opened at `entry`.
    pub fn stop_loss(&self, entry: f64, direction: Direction) -> Result<f64, SignalError> {
        let zones = self.zones()?;
        let atr = self.latest_atr()?;
        self.place_stop(&zones, atr, entry, direction)
    }

    pub fn target_price(&self, entry: f64, direction: Direction) -> Result<f64, SignalError> {
        let stop = self.stop_loss(entry, direction)?;
        Ok(risk::target(
            &self.structure(),
            entry,
            stop,
            direction,
            self.config.rr_ratio,
        ))
    }

    /// The trade to take at `current_price`, if any.
    pub fn evaluate(&self, current_price: f64) -> Result<Option<TradeDecision>, SignalError> {
        let scan = self.scan()?;
        self.decide(&scan, current_price)
    }

    /// Like [`evaluate`](Self::evaluate), but also returns the intermediate detections.
    pub fn analyze(&self, current_price: f64) -> Result<MarketAnalysis, SignalError> {
        let scan = self.scan()?;
        let decision = self.decide(&scan, current_price)?;
        Ok(MarketAnalysis {
            current_price,
            structure: scan.structure,
            zones: scan.zones,
            momentum: scan.momentum,
            triggers: scan.triggers,
            decision,
        })
    }

    fn momentum_evaluator(&self) -> MomentumEvaluator<'_> {
        MomentumEvaluator::new(
            self.indicators.as_ref(),
            self.config.rsi_period,
            self.config.momentum_lookback,
        )
        .with_stochastic(self.config.stochastic)
    }

    fn trigger_detector(&self) -> TriggerDetector {
        TriggerDetector::new(self.config.v_shape_lookback)
    }

    /// Latest lower-timeframe ATR when stops are ATR-based, `None` otherwise.
    fn latest_atr(&self) -> Result<Option<f64>, SignalError> {
        let StopMode::Atr { period, .. } = self.config.stop_mode else {
            return Ok(None);
        };
        let atr = self.indicators.atr(
            &self.ltf.highs(),
            &self.ltf.lows(),
            &self.ltf.closes(),
            period,
        );
        match atr.last() {
            Some(v) if !v.is_nan() => Ok(Some(*v)),
            _ => Err(SignalError::short("ATR warm-up", period + 1, self.ltf.len())),
        }
    }

    fn scan(&self) -> Result<Scan, SignalError> {
        let momentum = self.momentum()?;
        let triggers = self.trigger_detector().detect(&self.ltf, momentum.rsi)?;
        Ok(Scan {
            structure: self.structure(),
            zones: self.zones()?,
            momentum,
            triggers,
            atr: self.latest_atr()?,
        })
    }

    fn place_stop(
        &self,
        zones: &ZoneSet,
        atr: Option<f64>,
        entry: f64,
        direction: Direction,
    ) -> Result<f64, SignalError> {
        match (self.config.stop_mode, atr) {
            (StopMode::Zone, _) => Ok(risk::zone_stop(
                zones,
                entry,
                direction,
                self.config.stop_buffer,
            )),
            (StopMode::Atr { multiplier, .. }, Some(atr)) => {
                Ok(risk::atr_stop(entry, direction, atr, multiplier))
            }
            (StopMode::Atr { period, .. }, None) => Err(SignalError::short(
                "ATR warm-up",
                period + 1,
                self.ltf.len(),
            )),
        }
    }

    /// Whether the latest lower-timeframe bar falls inside the trading window.
    fn in_session(&self) -> Result<bool, SignalError> {
        let Some(hours) = &self.config.trading_hours else {
            return Ok(true);
        };
        match self.ltf.last() {
            Some(bar) => hours.contains(bar.timestamp.time()),
            None => Ok(false),
        }
    }

    fn qualifies(&self, trigger: &Trigger) -> bool {
        if trigger.strength <= self.config.min_trigger_strength {
            return false;
        }
        match self.config.fvg_threshold {
            Some(threshold) => FvgFilter::new(threshold).passes(self.ltf.bars(), trigger.bar_index),
            None => true,
        }
    }

    fn side_conditions_hold(&self, scan: &Scan, direction: Direction, price: f64) -> bool {
        let m = &scan.momentum;
        let confirm = self.config.stochastic_confirmation;
        match direction {
            Direction::Long => {
                m.is_oversold()
                    && scan.zones.demand.iter().any(|z| z.price < price)
                    && (!confirm || m.stoch_k < 20.0)
            }
            Direction::Short => {
                m.is_overbought()
                    && scan.zones.supply.iter().any(|z| z.price > price)
                    && (!confirm || m.stoch_k > 80.0)
            }
        }
    }

    fn decide(&self, scan: &Scan, current_price: f64) -> Result<Option<TradeDecision>, SignalError> {
        if !self.in_session()? {
            debug!(
                last_bar = ?self.ltf.last().map(|b| b.timestamp),
                "outside trading hours"
            );
            return Ok(None);
        }

        for trigger in scan.triggers.iter().filter(|t| self.qualifies(t)) {
            let direction = if current_price > trigger.price {
                Direction::Long
            } else if current_price < trigger.price {
                Direction::Short
            } else {
                continue;
            };

            if !self.side_conditions_hold(scan, direction, current_price) {
                debug!(
                    bar_index = trigger.bar_index,
                    kind = %trigger.kind,
                    %direction,
                    rsi = scan.momentum.rsi,
                    "candidate rejected"
                );
                continue;
            }

            let entry = current_price;
            let stop = self.place_stop(&scan.zones, scan.atr, entry, direction)?;
            let target = risk::target(&scan.structure, entry, stop, direction, self.config.rr_ratio);
            let risk_reward = risk::risk_reward(entry, stop, target, direction)?;

            info!(
                %direction,
                entry,
                stop,
                target,
                risk_reward,
                trigger = %trigger.kind,
                bar_index = trigger.bar_index,
                "trade selected"
            );
            return Ok(Some(TradeDecision {
                direction,
                entry_price: entry,
                stop_loss: stop,
                target_price: target,
                risk_reward,
                trigger_type: trigger.kind,
                trigger_index: trigger.bar_index,
                momentum: scan.momentum,
            }));
        }

        debug!(current_price, "no qualifying setup");
        Ok(None)
    }
}
