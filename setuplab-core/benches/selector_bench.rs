//! Criterion benchmarks for SetupLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator primitives (RSI, stochastic, ATR)
//! 2. Detectors (structure, zones, triggers)
//! 3. Full selector evaluation at several series lengths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use setuplab_core::detectors::{StructureDetector, TriggerDetector, ZoneDetector};
use setuplab_core::indicators::{Atr, Rsi, Stochastic};
use setuplab_core::synthetic::synthetic_series;
use setuplab_core::{PriceSeries, SelectorConfig, TradeSelector};

fn series(label: &str, n: usize) -> PriceSeries {
    synthetic_series(label, n, 15).unwrap()
}

fn bench_indicators(c: &mut Criterion) {
    let s = series("bench-indicators", 2_000);
    let (highs, lows, closes) = (s.highs(), s.lows(), s.closes());

    let mut group = c.benchmark_group("indicators");
    group.bench_function("rsi_14", |b| {
        b.iter(|| Rsi::new(14).compute(black_box(&closes)))
    });
    group.bench_function("stochastic_14_3_3", |b| {
        b.iter(|| Stochastic::new(14, 3, 3).compute(black_box(&highs), &lows, &closes))
    });
    group.bench_function("atr_14", |b| {
        b.iter(|| Atr::new(14).compute(black_box(&highs), &lows, &closes))
    });
    group.finish();
}

fn bench_detectors(c: &mut Criterion) {
    let s = series("bench-detectors", 2_000);

    let mut group = c.benchmark_group("detectors");
    group.bench_function("structure_w5", |b| {
        let detector = StructureDetector::new(5);
        b.iter(|| detector.detect(black_box(&s)))
    });
    group.bench_function("zones", |b| {
        let detector = ZoneDetector::default();
        b.iter(|| detector.detect(black_box(&s)).unwrap())
    });
    group.bench_function("triggers", |b| {
        let detector = TriggerDetector::default();
        b.iter(|| detector.detect(black_box(&s), 50.0).unwrap())
    });
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for n in [100, 500, 2_000] {
        let htf = series("bench-htf", n / 4);
        let ltf = series("bench-ltf", n);
        let price = ltf.last().map(|b| b.close).unwrap_or(100.0);
        let selector = TradeSelector::new(htf, ltf, SelectorConfig::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &price, |b, &price| {
            b.iter(|| selector.evaluate(black_box(price)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_detectors, bench_evaluate);
criterion_main!(benches);
