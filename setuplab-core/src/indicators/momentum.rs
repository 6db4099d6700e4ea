//! Momentum: simple lookback difference, not percentage.
//!
//! momentum[t] = close[t] - close[t-period]

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self { period }
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        for i in self.period..n {
            let prev = closes[i - self.period];
            let curr = closes[i];
            if !(prev.is_nan() || curr.is_nan()) {
                result[i] = curr - prev;
            }
        }

        result
    }
}
