//! Rolling close-price volatility.
//!
//! Sample standard deviation (divide by N - 1) of close over the trailing
//! `window` bars. Lookback: window - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Volatility {
    window: usize,
    name: String,
}

impl Volatility {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "volatility window must be >= 2");
        Self {
            window,
            name: format!("volatility_{window}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.window {
            return result;
        }

        for i in (self.window - 1)..n {
            let window = &bars[i + 1 - self.window..=i];
            if window.iter().any(|b| b.close.is_nan()) {
                continue;
            }
            let mean = window.iter().map(|b| b.close).sum::<f64>() / self.window as f64;
            let sum_sq = window.iter().map(|b| (b.close - mean).powi(2)).sum::<f64>();
            result[i] = (sum_sq / (self.window - 1) as f64).sqrt();
        }

        result
    }
}
