//! Synthetic price series for demos and benchmarks.
//!
//! A seeded random walk from 100.0 with occasional volume bursts, so the
//! zone and trigger detectors have something to find. The seed is derived
//! from the label, so the same label always yields the same bars.

use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Bar, BarError, PriceSeries};

/// `n` bars spaced `bar_minutes` apart, deterministic per `label`.
pub fn synthetic_series(label: &str, n: usize, bar_minutes: i64) -> Result<PriceSeries, BarError> {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let start = session_start();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;

    for i in 0..n {
        let step: f64 = rng.gen_range(-0.01..0.01);
        let open = price;
        let close = price * (1.0 + step);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.004));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.004));
        let burst = if rng.gen_bool(0.08) {
            rng.gen_range(2.0..4.0)
        } else {
            1.0
        };
        let volume = rng.gen_range(800.0..1200.0) * burst;

        bars.push(Bar {
            timestamp: start + chrono::Duration::minutes(bar_minutes * i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    PriceSeries::new(label, bars)
}

fn session_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
