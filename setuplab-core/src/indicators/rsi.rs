//! Relative Strength Index (RSI), Wilder-smoothed.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), first defined at index `period`.
//! No movement at all reads 50; only gains reads 100; only losses reads 0.
//! A NaN close ends the series: every later value stays NaN.

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period }
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let p = self.period;
        let mut out = vec![f64::NAN; closes.len()];
        if closes.len() <= p {
            return out;
        }

        // deltas[k] is the move into bar k + 1.
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let seed = &deltas[..p];
        if seed.iter().any(|d| d.is_nan()) {
            return out;
        }

        let mut gain = seed.iter().map(|d| d.max(0.0)).sum::<f64>() / p as f64;
        let mut loss = seed.iter().map(|d| (-d).max(0.0)).sum::<f64>() / p as f64;
        out[p] = rsi_value(gain, loss);

        let k = 1.0 / p as f64;
        for (i, &d) in deltas.iter().enumerate().skip(p) {
            if d.is_nan() {
                break;
            }
            gain += k * (d.max(0.0) - gain);
            loss += k * ((-d).max(0.0) - loss);
            out[i + 1] = rsi_value(gain, loss);
        }
        out
    }
}

fn rsi_value(gain: f64, loss: f64) -> f64 {
    match (gain == 0.0, loss == 0.0) {
        (true, true) => 50.0,
        (_, true) => 100.0,
        (true, _) => 0.0,
        _ => 100.0 - 100.0 / (1.0 + gain / loss),
    }
}
