//! Fair-value-gap filter: the jump between a bar's close and the previous bar's open.

use crate::domain::Bar;

/// `|close[i] - open[i-1]|`, or `None` for the first bar.
pub fn fvg_gap(bars: &[Bar], i: usize) -> Option<f64> {
    if i == 0 || i >= bars.len() {
        return None;
    }
    Some((bars[i].close - bars[i - 1].open).abs())
}

/// Passes bars whose gap is strictly wider than `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct FvgFilter {
    pub threshold: f64,
}

impl FvgFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn passes(&self, bars: &[Bar], i: usize) -> bool {
        fvg_gap(bars, i).is_some_and(|gap| gap > self.threshold)
    }
}
