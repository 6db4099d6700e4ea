//! Simple Moving Average (SMA) over an arbitrary series.
//!
//! Used to smooth stochastic %K and %D. A window containing NaN yields NaN,
//! so leading warm-up NaNs of the input carry through.

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    pub fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let mut sum: f64 = values[..self.period].iter().sum();
        let mut nan_in_window = values[..self.period].iter().any(|v| v.is_nan());
        if !nan_in_window {
            result[self.period - 1] = sum / self.period as f64;
        }

        // Roll the window forward
        for i in self.period..n {
            let leaving = values[i - self.period];
            let entering = values[i];
            sum = sum - leaving + entering;

            // NaN poisons the running sum, so rescan the window whenever one is nearby.
            if entering.is_nan() || leaving.is_nan() || nan_in_window {
                let window = &values[(i + 1 - self.period)..=i];
                nan_in_window = window.iter().any(|v| v.is_nan());
                sum = window.iter().sum();
                if nan_in_window {
                    continue;
                }
            }

            result[i] = sum / self.period as f64;
        }

        result
    }
}
