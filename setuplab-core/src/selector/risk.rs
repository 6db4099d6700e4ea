//! Stop, target, and risk/reward policy.

use crate::detectors::{MarketStructure, ZoneSet};
use crate::domain::Direction;
use crate::error::SignalError;

/// Stop distance when no zone qualifies.
pub const FALLBACK_STOP_PCT: f64 = 0.02;

/// Stop `buffer` (a fraction of the zone price) beyond the nearest opposing
/// zone, falling back to a fixed percentage.
pub fn zone_stop(zones: &ZoneSet, entry: f64, direction: Direction, buffer: f64) -> f64 {
    match direction {
        Direction::Long => zones
            .nearest_demand_below(entry)
            .map(|z| z.price * (1.0 - buffer))
            .unwrap_or(entry * (1.0 - FALLBACK_STOP_PCT)),
        Direction::Short => zones
            .nearest_supply_above(entry)
            .map(|z| z.price * (1.0 + buffer))
            .unwrap_or(entry * (1.0 + FALLBACK_STOP_PCT)),
    }
}

pub fn atr_stop(entry: f64, direction: Direction, atr: f64, multiplier: f64) -> f64 {
    match direction {
        Direction::Long => entry - atr * multiplier,
        Direction::Short => entry + atr * multiplier,
    }
}

/// Nearest structure level beyond entry, pushed out to at least `rr_ratio` times the risk.
pub fn target(
    structure: &MarketStructure,
    entry: f64,
    stop: f64,
    direction: Direction,
    rr_ratio: f64,
) -> f64 {
    let risk = (entry - stop).abs();
    match direction {
        Direction::Long => {
            let floor = entry + risk * rr_ratio;
            structure
                .bos_above(entry)
                .reduce(f64::min)
                .map_or(floor, |nearest| nearest.max(floor))
        }
        Direction::Short => {
            let floor = entry - risk * rr_ratio;
            structure
                .choch_below(entry)
                .reduce(f64::max)
                .map_or(floor, |nearest| nearest.min(floor))
        }
    }
}

pub fn risk_reward(
    entry: f64,
    stop: f64,
    target: f64,
    direction: Direction,
) -> Result<f64, SignalError> {
    if entry == stop {
        return Err(SignalError::DegenerateRisk { entry, stop });
    }
    Ok(match direction {
        Direction::Long => (target - entry) / (entry - stop),
        Direction::Short => (entry - target) / (stop - entry),
    })
}
