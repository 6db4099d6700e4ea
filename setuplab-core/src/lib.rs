//! SetupLab Core: rule-based trade setups from two timeframes.
//!
//! This crate contains the whole decision pipeline:
//! - Domain types (bars, price series, trade decisions)
//! - Indicator primitives behind the injectable `IndicatorLibrary` trait
//! - Market structure (swings, BOS, CHOCH) on the higher timeframe
//! - Supply/demand zones, momentum, and candlestick triggers on the lower timeframe
//! - Stop, target, and selection policy composing them into one decision

pub mod config;
pub mod detectors;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod selector;
pub mod synthetic;

pub use config::{SelectorConfig, StochasticParams, StopMode, TradingHours};
pub use domain::{Bar, Direction, PriceSeries, TradeDecision};
pub use error::SignalError;
pub use indicators::{IndicatorLibrary, NativeIndicators};
pub use selector::{MarketAnalysis, TradeSelector};
