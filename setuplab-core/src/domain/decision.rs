//! Trade direction and the final trade recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::detectors::{MomentumSnapshot, TriggerKind};
use crate::error::SignalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            _ => Err(SignalError::InvalidDirection(s.to_string())),
        }
    }
}

/// A fully specified trade setup. Only produced when every gate passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    /// Reward distance over risk distance.
    pub risk_reward: f64,
    pub trigger_type: TriggerKind,
    /// Bar index (lower timeframe) of the trigger that qualified.
    pub trigger_index: usize,
    pub momentum: MomentumSnapshot,
}

impl TradeDecision {
    /// Distance from entry to stop.
    pub fn risk(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Distance from entry to target.
    pub fn reward(&self) -> f64 {
        (self.target_price - self.entry_price).abs()
    }
}
