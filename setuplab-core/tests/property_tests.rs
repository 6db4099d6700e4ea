//! Property tests for detector and selector invariants.
//!
//! Uses proptest to verify:
//! 1. Swing strictness: a swing dominates its whole window, ties disqualify
//! 2. Level counts: BOS/CHOCH never outnumber consecutive swing pairs
//! 3. Zone strength grows with volume and recency
//! 4. Engulfing exclusivity: never bullish and bearish on the same bar
//! 5. Weak triggers never trade, whatever the price or momentum
//! 6. Stops sit on the losing side of entry and targets honour the RR floor
//!    while landing on the nearest structure level beyond it
//! 7. The bar generator actually produces swings, BOS and CHOCH

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use setuplab_core::detectors::zones::zone_strength;
use setuplab_core::detectors::{
    StructureDetector, TriggerDetector, TriggerKind, Zone, ZoneSet, ZoneSide,
};
use setuplab_core::selector::risk;
use setuplab_core::{
    Bar, Direction, IndicatorLibrary, PriceSeries, SelectorConfig, TradeSelector,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
        + chrono::Duration::minutes(5 * i as i64)
}

/// Each bar opens at the previous close, with half-point wicks. Highs and
/// lows never stand out from both neighbours, so these series carry no swings.
fn bars_from_closes(closes: &[f64], volume: f64) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: ts(i),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume,
            }
        })
        .collect()
}

struct FixedRsi(f64);

impl IndicatorLibrary for FixedRsi {
    fn rsi(&self, closes: &[f64], _period: usize) -> Vec<f64> {
        vec![self.0; closes.len()]
    }

    fn stochastic(
        &self,
        _highs: &[f64],
        _lows: &[f64],
        closes: &[f64],
        _fastk: usize,
        _slowk: usize,
        _slowd: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        (vec![50.0; closes.len()], vec![50.0; closes.len()])
    }

    fn momentum(&self, closes: &[f64], _period: usize) -> Vec<f64> {
        vec![0.0; closes.len()]
    }

    fn atr(&self, _highs: &[f64], _lows: &[f64], closes: &[f64], _period: usize) -> Vec<f64> {
        vec![1.0; closes.len()]
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// Independent OHLC per bar on a half-point grid: close in 90..110, open up to
/// 2 away, wicks up to 2 on each side. Equal highs and lows (ties) are common.
fn arb_bars(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Bar>> {
    let bar = (180..220_i32, -4..=4_i32, 0..=4_i32, 0..=4_i32);
    prop::collection::vec(bar, len).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (close, open_offset, up, down))| {
                let close = close as f64 * 0.5;
                let open = close + open_offset as f64 * 0.5;
                Bar {
                    timestamp: ts(i),
                    open,
                    high: open.max(close) + up as f64 * 0.5,
                    low: open.min(close) - down as f64 * 0.5,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    })
}

/// Closes hugging 100, so no candle body is larger than about 2%.
fn arb_quiet_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(99.0..101.0_f64, 20..60)
}

fn arb_zones(side: ZoneSide) -> impl Strategy<Value = Vec<Zone>> {
    prop::collection::vec(10.0..200.0_f64, 0..6).prop_map(move |prices| {
        prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| Zone {
                side,
                bar_index: i + 1,
                price,
                volume: 2000.0,
                strength: 1.0,
            })
            .collect()
    })
}

// ── 1. Swing strictness ──────────────────────────────────────────────

proptest! {
    #[test]
    fn swings_match_brute_force(bars in arb_bars(5..60), w in 1..5_usize) {
        let series = PriceSeries::new("1h", bars).unwrap();
        let detector = StructureDetector::new(w);
        let highs = series.highs();
        let lows = series.lows();
        let n = highs.len();

        let expected_highs: Vec<usize> = if n < 2 * w + 1 {
            Vec::new()
        } else {
            (w..n - w)
                .filter(|&i| (i - w..=i + w).all(|j| j == i || highs[i] > highs[j]))
                .collect()
        };
        let expected_lows: Vec<usize> = if n < 2 * w + 1 {
            Vec::new()
        } else {
            (w..n - w)
                .filter(|&i| (i - w..=i + w).all(|j| j == i || lows[i] < lows[j]))
                .collect()
        };

        let got_highs: Vec<usize> = detector.swing_highs(&series).iter().map(|s| s.bar_index).collect();
        let got_lows: Vec<usize> = detector.swing_lows(&series).iter().map(|s| s.bar_index).collect();
        prop_assert_eq!(got_highs, expected_highs);
        prop_assert_eq!(got_lows, expected_lows);
    }

    /// Copying a swing high onto a neighbour removes the swing.
    #[test]
    fn ties_disqualify_swings(mut bars in arb_bars(11..40), offset in 1..=3_usize) {
        let w = 3;
        let series = PriceSeries::new("1h", bars.clone()).unwrap();
        let detector = StructureDetector::new(w);
        let swings = detector.swing_highs(&series);
        prop_assume!(!swings.is_empty());

        let swing = swings[0];
        let neighbour = swing.bar_index + offset;
        bars[neighbour].high = swing.price;
        let tied = PriceSeries::new("1h", bars).unwrap();
        let after = detector.swing_highs(&tied);
        prop_assert!(after.iter().all(|s| s.bar_index != swing.bar_index));
    }
}

// ── 2. Level counts ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn levels_bounded_by_swing_pairs(bars in arb_bars(11..80), w in 1..5_usize) {
        let series = PriceSeries::new("4h", bars).unwrap();
        let structure = StructureDetector::new(w).detect(&series);

        prop_assert!(structure.bos.len() <= structure.swing_highs.len().saturating_sub(1));
        prop_assert!(structure.choch.len() <= structure.swing_lows.len().saturating_sub(1));

        for level in &structure.bos {
            let pos = structure.swing_highs.iter().position(|s| s.bar_index == level.bar_index).unwrap();
            prop_assert!(pos >= 1);
            prop_assert!(level.price > structure.swing_highs[pos - 1].price);
        }
        for level in &structure.choch {
            let pos = structure.swing_lows.iter().position(|s| s.bar_index == level.bar_index).unwrap();
            prop_assert!(pos >= 1);
            prop_assert!(level.price < structure.swing_lows[pos - 1].price);
        }
    }
}

// ── 3. Zone strength monotonicity ────────────────────────────────────

proptest! {
    #[test]
    fn zone_strength_grows_with_volume_and_recency(
        low in 50.0..150.0_f64,
        range in 0.1..5.0_f64,
        v1 in 100.0..5000.0_f64,
        extra in 1.0..5000.0_f64,
        index in 1..50_usize,
    ) {
        let n = 60;
        let make = |volume: f64| Bar {
            timestamp: ts(0),
            open: low + range / 2.0,
            high: low + range,
            low,
            close: low + range / 2.0,
            volume,
        };

        for side in [ZoneSide::Supply, ZoneSide::Demand] {
            let weaker = zone_strength(&make(v1), side, index, n, 1000.0).unwrap();
            let louder = zone_strength(&make(v1 + extra), side, index, n, 1000.0).unwrap();
            let later = zone_strength(&make(v1), side, index + 1, n, 1000.0).unwrap();
            prop_assert!(louder > weaker);
            prop_assert!(later > weaker);
        }
    }
}

// ── 4. Engulfing exclusivity ─────────────────────────────────────────

proptest! {
    #[test]
    fn engulfing_is_one_sided(bars in arb_bars(4..60), lookback in 2..8_usize) {
        let series = PriceSeries::new("15m", bars).unwrap();
        let triggers = TriggerDetector::new(lookback).detect(&series, 50.0).unwrap();

        for i in 0..series.len() {
            let bullish = triggers.iter().any(|t| t.bar_index == i && t.kind == TriggerKind::BullishEngulfing);
            let bearish = triggers.iter().any(|t| t.bar_index == i && t.kind == TriggerKind::BearishEngulfing);
            prop_assert!(!(bullish && bearish));
        }
        prop_assert!(triggers.iter().all(|t| t.bar_index >= 2 && t.bar_index <= series.len() - 2));
    }
}

// ── 5. Weak triggers never trade ─────────────────────────────────────

proptest! {
    #[test]
    fn weak_triggers_never_trade(
        closes in arb_quiet_closes(),
        rsi in 0.0..100.0_f64,
        price in 90.0..110.0_f64,
    ) {
        // Flat volume caps strength at 0.3 + 0.4 * ~0.02 + 0.3, below the 0.7 floor.
        let ltf = PriceSeries::new("15m", bars_from_closes(&closes, 1000.0)).unwrap();
        let htf = PriceSeries::new("4h", bars_from_closes(&closes, 1000.0)).unwrap();
        let selector = TradeSelector::with_indicators(
            htf,
            ltf,
            SelectorConfig::default(),
            Box::new(FixedRsi(rsi)),
        )
        .unwrap();

        let triggers = selector.triggers().unwrap();
        prop_assert!(triggers.iter().all(|t| t.strength <= 0.7));
        prop_assert!(selector.evaluate(price).unwrap().is_none());
    }
}

// ── 6. Stops and targets ─────────────────────────────────────────────

proptest! {
    #[test]
    fn zone_stops_sit_on_losing_side(
        supply in arb_zones(ZoneSide::Supply),
        demand in arb_zones(ZoneSide::Demand),
        entry in 50.0..150.0_f64,
        buffer in 0.0..0.05_f64,
    ) {
        let zones = ZoneSet { supply, demand };
        prop_assert!(risk::zone_stop(&zones, entry, Direction::Long, buffer) < entry);
        prop_assert!(risk::zone_stop(&zones, entry, Direction::Short, buffer) > entry);
    }

    #[test]
    fn targets_honour_rr_floor(
        bars in arb_bars(11..80),
        entry in 90.0..110.0_f64,
        risk_distance in 0.1..5.0_f64,
        rr in 0.5..4.0_f64,
    ) {
        let series = PriceSeries::new("4h", bars).unwrap();
        let structure = StructureDetector::new(2).detect(&series);

        let long_stop = entry - risk_distance;
        let long_target = risk::target(&structure, entry, long_stop, Direction::Long, rr);
        let long_rr = risk::risk_reward(entry, long_stop, long_target, Direction::Long).unwrap();
        prop_assert!(long_rr >= rr - 1e-9);
        let long_floor = entry + risk_distance * rr;
        if let Some(nearest) = structure.bos_above(entry).reduce(f64::min) {
            prop_assert_eq!(long_target, nearest.max(long_floor));
        } else {
            prop_assert_eq!(long_target, long_floor);
        }

        let short_stop = entry + risk_distance;
        let short_target = risk::target(&structure, entry, short_stop, Direction::Short, rr);
        let short_rr = risk::risk_reward(entry, short_stop, short_target, Direction::Short).unwrap();
        prop_assert!(short_rr >= rr - 1e-9);
        let short_floor = entry - risk_distance * rr;
        if let Some(nearest) = structure.choch_below(entry).reduce(f64::max) {
            prop_assert_eq!(short_target, nearest.min(short_floor));
        } else {
            prop_assert_eq!(short_target, short_floor);
        }
    }
}

// ── 7. Generator coverage ────────────────────────────────────────────

/// The structure properties above only mean something if the generated
/// series regularly contain swings and levels.
#[test]
fn generated_series_carry_structure() {
    let mut runner = TestRunner::deterministic();
    let strategy = arb_bars(20..60);
    let (mut with_swings, mut with_bos, mut with_choch) = (0, 0, 0);
    let samples = 200;

    for _ in 0..samples {
        let bars = strategy.new_tree(&mut runner).unwrap().current();
        let series = PriceSeries::new("4h", bars).unwrap();
        let structure = StructureDetector::new(2).detect(&series);
        if !structure.swing_highs.is_empty() && !structure.swing_lows.is_empty() {
            with_swings += 1;
        }
        if !structure.bos.is_empty() {
            with_bos += 1;
        }
        if !structure.choch.is_empty() {
            with_choch += 1;
        }
    }

    assert!(with_swings * 2 > samples, "only {with_swings}/{samples} series had swings");
    assert!(with_bos * 4 > samples, "only {with_bos}/{samples} series had a BOS");
    assert!(with_choch * 4 > samples, "only {with_choch}/{samples} series had a CHOCH");
}

#[test]
fn closes_only_series_carry_no_swings() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
    let series = PriceSeries::new("4h", bars_from_closes(&closes, 1000.0)).unwrap();
    let structure = StructureDetector::new(1).detect(&series);
    assert!(structure.swing_highs.is_empty());
    assert!(structure.swing_lows.is_empty());
}
