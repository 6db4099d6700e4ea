//! Market structure on the higher timeframe: swing points, BOS and CHOCH levels.
//!
//! A bar is a swing high when its high is strictly greater than every high in
//! the `swing_window` bars on each side (ties disqualify); swing lows mirror
//! this. A swing high above the previous swing high is a break of structure
//! (BOS); a swing low below the previous swing low is a change of character
//! (CHOCH). Only indices in `[W, n - W)` are examined, so a series shorter
//! than `2W + 1` bars simply has no structure.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Bar, PriceSeries};

/// A strict local extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub bar_index: usize,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Bos,
    Choch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureLevel {
    pub kind: LevelKind,
    pub bar_index: usize,
    pub price: f64,
}

/// Output of one structure scan. Lists are in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStructure {
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub bos: Vec<StructureLevel>,
    pub choch: Vec<StructureLevel>,
}

impl MarketStructure {
    /// BOS prices strictly above `price`.
    pub fn bos_above(&self, price: f64) -> impl Iterator<Item = f64> + '_ {
        self.bos.iter().map(|l| l.price).filter(move |&p| p > price)
    }

    /// CHOCH prices strictly below `price`.
    pub fn choch_below(&self, price: f64) -> impl Iterator<Item = f64> + '_ {
        self.choch.iter().map(|l| l.price).filter(move |&p| p < price)
    }
}

#[derive(Debug, Clone)]
pub struct StructureDetector {
    swing_window: usize,
}

impl StructureDetector {
    pub fn new(swing_window: usize) -> Self {
        assert!(swing_window >= 1, "swing_window must be >= 1");
        Self { swing_window }
    }

    pub fn swing_window(&self) -> usize {
        self.swing_window
    }

    pub fn swing_highs(&self, series: &PriceSeries) -> Vec<SwingPoint> {
        self.swings(series.bars(), |b| b.high, |candidate, other| candidate > other)
    }

    pub fn swing_lows(&self, series: &PriceSeries) -> Vec<SwingPoint> {
        self.swings(series.bars(), |b| b.low, |candidate, other| candidate < other)
    }

    pub fn detect(&self, series: &PriceSeries) -> MarketStructure {
        let swing_highs = self.swing_highs(series);
        let swing_lows = self.swing_lows(series);

        let bos = breaks(&swing_highs, LevelKind::Bos, |curr, prev| curr > prev);
        let choch = breaks(&swing_lows, LevelKind::Choch, |curr, prev| curr < prev);

        debug!(
            timeframe = series.timeframe(),
            swing_highs = swing_highs.len(),
            swing_lows = swing_lows.len(),
            bos = bos.len(),
            choch = choch.len(),
            "market structure scanned"
        );

        MarketStructure {
            swing_highs,
            swing_lows,
            bos,
            choch,
        }
    }

    fn swings(
        &self,
        bars: &[Bar],
        field: impl Fn(&Bar) -> f64,
        beats: impl Fn(f64, f64) -> bool,
    ) -> Vec<SwingPoint> {
        let w = self.swing_window;
        let n = bars.len();
        if n < 2 * w + 1 {
            return Vec::new();
        }

        (w..n - w)
            .filter_map(|i| {
                let candidate = field(&bars[i]);
                let dominates = bars[i - w..i]
                    .iter()
                    .chain(&bars[i + 1..=i + w])
                    .all(|other| beats(candidate, field(other)));
                dominates.then_some(SwingPoint {
                    bar_index: i,
                    price: candidate,
                })
            })
            .collect()
    }
}

impl Default for StructureDetector {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Each swing that beats its immediate predecessor becomes a level.
fn breaks(
    swings: &[SwingPoint],
    kind: LevelKind,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<StructureLevel> {
    swings
        .windows(2)
        .filter(|pair| beats(pair[1].price, pair[0].price))
        .map(|pair| StructureLevel {
            kind,
            bar_index: pair[1].bar_index,
            price: pair[1].price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_bars::bar_at;

    /// Bars whose high and low are both `level` ± 1, one per entry.
    fn series_from_levels(levels: &[f64]) -> PriceSeries {
        let bars = levels
            .iter()
            .enumerate()
            .map(|(i, &m)| bar_at(i, m, m + 1.0, m - 1.0, m, 1000.0))
            .collect();
        PriceSeries::new("4h", bars).unwrap()
    }

    #[test]
    fn finds_strict_swing_high_and_low() {
        let series = series_from_levels(&[10.0, 11.0, 15.0, 11.0, 10.0, 7.0, 5.0, 7.0, 9.0]);
        let detector = StructureDetector::new(2);

        let highs = detector.swing_highs(&series);
        assert_eq!(highs, vec![SwingPoint { bar_index: 2, price: 16.0 }]);

        let lows = detector.swing_lows(&series);
        assert_eq!(lows, vec![SwingPoint { bar_index: 6, price: 4.0 }]);
    }

    #[test]
    fn tie_disqualifies_swing() {
        let series = series_from_levels(&[10.0, 11.0, 15.0, 15.0, 10.0, 9.0]);
        let detector = StructureDetector::new(2);
        assert!(detector.swing_highs(&series).is_empty());
    }

    #[test]
    fn edges_are_never_swings() {
        // Highest bar sits inside the first W bars.
        let series = series_from_levels(&[20.0, 10.0, 11.0, 12.0, 11.0, 10.0]);
        let detector = StructureDetector::new(2);
        let highs = detector.swing_highs(&series);
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].bar_index, 3);
    }

    #[test]
    fn bos_and_choch_compare_to_previous_swing() {
        // Swing highs at 2 (16), 6 (18), 10 (17); swing lows at 4 (9), 8 (7), 12 (8)
        let series = series_from_levels(&[
            12.0, 13.0, 15.0, 13.0, 10.0, 13.0, 17.0, 12.0, 8.0, 12.0, 16.0, 12.0, 9.0, 12.0,
            13.0,
        ]);
        let structure = StructureDetector::new(1).detect(&series);

        let high_idx: Vec<usize> = structure.swing_highs.iter().map(|s| s.bar_index).collect();
        assert_eq!(high_idx, vec![2, 6, 10]);
        let low_idx: Vec<usize> = structure.swing_lows.iter().map(|s| s.bar_index).collect();
        assert_eq!(low_idx, vec![4, 8, 12]);

        assert_eq!(structure.bos.len(), 1);
        assert_eq!(structure.bos[0].bar_index, 6);
        assert_eq!(structure.bos[0].price, 18.0);
        assert_eq!(structure.bos[0].kind, LevelKind::Bos);

        assert_eq!(structure.choch.len(), 1);
        assert_eq!(structure.choch[0].bar_index, 8);
        assert_eq!(structure.choch[0].price, 7.0);
    }

    #[test]
    fn short_series_has_no_structure() {
        let series = series_from_levels(&[10.0, 15.0, 12.0]);
        let structure = StructureDetector::new(5).detect(&series);
        assert_eq!(structure, MarketStructure::default());
    }

    #[test]
    fn level_filters() {
        let structure = MarketStructure {
            bos: vec![
                StructureLevel { kind: LevelKind::Bos, bar_index: 3, price: 105.0 },
                StructureLevel { kind: LevelKind::Bos, bar_index: 9, price: 110.0 },
            ],
            choch: vec![StructureLevel { kind: LevelKind::Choch, bar_index: 5, price: 95.0 }],
            ..Default::default()
        };
        assert_eq!(structure.bos_above(105.0).collect::<Vec<_>>(), vec![110.0]);
        assert_eq!(structure.choch_below(96.0).collect::<Vec<_>>(), vec![95.0]);
        assert_eq!(structure.choch_below(95.0).count(), 0);
    }
}
