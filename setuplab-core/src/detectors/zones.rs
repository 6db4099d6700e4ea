//! Supply and demand zones on the lower timeframe.
//!
//! A supply zone is a one-bar local high (`high[i]` above both neighbours)
//! printed on volume above `avg_volume * volume_threshold`; a demand zone is
//! the mirrored local low. Both sides are tested independently, so one bar
//! can open a zone on each side.
//!
//! Strength is a weighted composite:
//!
//! ```text
//! 0.4 * volume[i] / avg_volume + 0.4 * price_move + 0.2 * (1 - (n - i) / n)
//! ```
//!
//! with `price_move = (high - low) / low` for supply and `(high - low) / high`
//! for demand. The volume term is a raw ratio, so strength is not bounded by
//! 1.0 and is deliberately left unclamped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Bar, PriceSeries};
use crate::error::SignalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSide {
    Supply,
    Demand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub side: ZoneSide,
    pub bar_index: usize,
    /// High of the bar for supply, low for demand.
    pub price: f64,
    pub volume: f64,
    pub strength: f64,
}

/// Zones found in one scan, each side in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    pub supply: Vec<Zone>,
    pub demand: Vec<Zone>,
}

impl ZoneSet {
    /// Demand zone with the greatest price strictly below `price`.
    pub fn nearest_demand_below(&self, price: f64) -> Option<&Zone> {
        self.demand
            .iter()
            .filter(|z| z.price < price)
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Supply zone with the least price strictly above `price`.
    pub fn nearest_supply_above(&self, price: f64) -> Option<&Zone> {
        self.supply
            .iter()
            .filter(|z| z.price > price)
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }

    pub fn len(&self) -> usize {
        self.supply.len() + self.demand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supply.is_empty() && self.demand.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ZoneDetector {
    volume_threshold: f64,
}

impl ZoneDetector {
    /// Interior bars need a neighbour on each side.
    pub const MIN_BARS: usize = 3;

    pub fn new(volume_threshold: f64) -> Self {
        Self { volume_threshold }
    }

    pub fn volume_threshold(&self) -> f64 {
        self.volume_threshold
    }

    pub fn detect(&self, series: &PriceSeries) -> Result<ZoneSet, SignalError> {
        let bars = series.bars();
        let n = bars.len();
        if n < Self::MIN_BARS {
            return Err(SignalError::short("zone detection", Self::MIN_BARS, n));
        }
        let avg_volume = series.avg_volume().unwrap_or(0.0);
        if avg_volume == 0.0 {
            return Err(SignalError::ZeroDenominator {
                what: "average volume",
            });
        }
        let min_volume = avg_volume * self.volume_threshold;

        let mut zones = ZoneSet::default();
        for i in 1..n - 1 {
            let (prev, bar, next) = (&bars[i - 1], &bars[i], &bars[i + 1]);
            if bar.volume <= min_volume {
                continue;
            }
            if bar.high > prev.high && bar.high > next.high {
                zones.supply.push(Zone {
                    side: ZoneSide::Supply,
                    bar_index: i,
                    price: bar.high,
                    volume: bar.volume,
                    strength: zone_strength(bar, ZoneSide::Supply, i, n, avg_volume)?,
                });
            }
            if bar.low < prev.low && bar.low < next.low {
                zones.demand.push(Zone {
                    side: ZoneSide::Demand,
                    bar_index: i,
                    price: bar.low,
                    volume: bar.volume,
                    strength: zone_strength(bar, ZoneSide::Demand, i, n, avg_volume)?,
                });
            }
        }

        debug!(
            timeframe = series.timeframe(),
            supply = zones.supply.len(),
            demand = zones.demand.len(),
            avg_volume,
            "zones scanned"
        );
        Ok(zones)
    }
}

impl Default for ZoneDetector {
    fn default() -> Self {
        Self::new(1.5)
    }
}

/// Composite strength of a zone at bar `index` of an `n`-bar series.
pub fn zone_strength(
    bar: &Bar,
    side: ZoneSide,
    index: usize,
    n: usize,
    avg_volume: f64,
) -> Result<f64, SignalError> {
    if avg_volume == 0.0 {
        return Err(SignalError::ZeroDenominator {
            what: "average volume",
        });
    }
    if n == 0 {
        return Err(SignalError::ZeroDenominator {
            what: "series length",
        });
    }
    let range = bar.high - bar.low;
    let price_move = match side {
        ZoneSide::Supply if bar.low == 0.0 => {
            return Err(SignalError::ZeroDenominator { what: "bar low" })
        }
        ZoneSide::Supply => range / bar.low,
        ZoneSide::Demand if bar.high == 0.0 => {
            return Err(SignalError::ZeroDenominator { what: "bar high" })
        }
        ZoneSide::Demand => range / bar.high,
    };
    let volume_score = bar.volume / avg_volume;
    let time_factor = 1.0 - (n - index) as f64 / n as f64;

    Ok(0.4 * volume_score + 0.4 * price_move + 0.2 * time_factor)
}
