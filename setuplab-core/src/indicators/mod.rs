//! Indicator primitives and the injectable `IndicatorLibrary` capability.
//!
//! The detectors never compute indicators directly: they call whatever
//! `IndicatorLibrary` they were handed. `NativeIndicators` is the built-in
//! implementation; tests inject fixed-value libraries to pin momentum state.
//!
//! Every series returned is aligned to its input, with leading `f64::NAN`
//! during warm-up.

pub mod atr;
pub mod momentum;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use atr::Atr;
pub use momentum::Momentum;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;

/// Indicator computations the signal engine depends on.
pub trait IndicatorLibrary: Send + Sync {
    fn rsi(&self, closes: &[f64], period: usize) -> Vec<f64>;

    /// Slow stochastic. Returns `(%K, %D)`.
    fn stochastic(
        &self,
        highs: &[f64],
        lows: &[f64],
        closes: &[f64],
        fastk: usize,
        slowk: usize,
        slowd: usize,
    ) -> (Vec<f64>, Vec<f64>);

    fn momentum(&self, closes: &[f64], period: usize) -> Vec<f64>;

    fn atr(&self, highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64>;
}

/// Pure-Rust indicator implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeIndicators;

impl IndicatorLibrary for NativeIndicators {
    fn rsi(&self, closes: &[f64], period: usize) -> Vec<f64> {
        Rsi::new(period).compute(closes)
    }

    fn stochastic(
        &self,
        highs: &[f64],
        lows: &[f64],
        closes: &[f64],
        fastk: usize,
        slowk: usize,
        slowd: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        Stochastic::new(fastk, slowk, slowd).compute(highs, lows, closes)
    }

    fn momentum(&self, closes: &[f64], period: usize) -> Vec<f64> {
        Momentum::new(period).compute(closes)
    }

    fn atr(&self, highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
        Atr::new(period).compute(highs, lows, closes)
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
