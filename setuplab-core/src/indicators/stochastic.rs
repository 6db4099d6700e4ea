//! Slow Stochastic oscillator.
//!
//! raw %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over `fastk` bars
//! %K = SMA(raw %K, slowk), %D = SMA(%K, slowd)
//! A flat window (highest == lowest) reads 50.
//! First valid %D at index fastk + slowk + slowd - 3.

use super::sma::Sma;

#[derive(Debug, Clone)]
pub struct Stochastic {
    fastk: usize,
    slowk: usize,
    slowd: usize,
}

impl Stochastic {
    pub fn new(fastk: usize, slowk: usize, slowd: usize) -> Self {
        assert!(
            fastk >= 1 && slowk >= 1 && slowd >= 1,
            "Stochastic periods must be >= 1"
        );
        Self {
            fastk,
            slowk,
            slowd,
        }
    }

    /// Returns `(%K, %D)`, both aligned to the input length.
    pub fn compute(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = closes.len().min(highs.len()).min(lows.len());
        let mut raw_k = vec![f64::NAN; n];

        for i in (self.fastk.saturating_sub(1))..n {
            let start = i + 1 - self.fastk;
            let mut highest = f64::NEG_INFINITY;
            let mut lowest = f64::INFINITY;
            let mut void = closes[i].is_nan();
            for j in start..=i {
                if highs[j].is_nan() || lows[j].is_nan() {
                    void = true;
                    break;
                }
                highest = highest.max(highs[j]);
                lowest = lowest.min(lows[j]);
            }
            if void {
                continue;
            }
            let range = highest - lowest;
            raw_k[i] = if range == 0.0 {
                50.0
            } else {
                100.0 * (closes[i] - lowest) / range
            };
        }

        let k = Sma::new(self.slowk).compute(&raw_k);
        let d = Sma::new(self.slowd).compute(&k);
        (k, d)
    }
}
