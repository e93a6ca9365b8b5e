//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |prev_close-low|)
//! ATR: arithmetic mean of the trailing `period` true ranges.
//! Lookback: period (the first bar has no previous close).
//!
//! Two implementations of the same contract:
//! - `Atr::try_compute` keeps a running window sum. It needs a gap-free true
//!   range series and returns `None` otherwise.
//! - `atr_fallback` rebuilds every window from the last `period` available
//!   true ranges, so a bar with a missing high/low only blanks its own position.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Running-sum ATR. `None` when any bar after the first lacks a true range.
    pub fn try_compute(&self, bars: &[Bar]) -> Option<Vec<f64>> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        let tr = true_range(bars);

        if tr.iter().skip(1).any(|v| v.is_nan()) {
            return None;
        }
        if n < self.period + 1 {
            return Some(result);
        }

        // TR[0] has no previous close, so the first window is TR[1..=period].
        let mut sum: f64 = tr[1..=self.period].iter().sum();
        result[self.period] = sum / self.period as f64;
        for i in (self.period + 1)..n {
            sum += tr[i] - tr[i - self.period];
            result[i] = sum / self.period as f64;
        }

        Some(result)
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.try_compute(bars)
            .unwrap_or_else(|| atr_fallback(bars, self.period))
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |close[t-1]-low[t]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    let (h, l) = (bars[0].high, bars[0].low);
    if h.is_finite() && l.is_finite() {
        tr[0] = h - l;
    }

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_finite() && l.is_finite() && pc.is_finite() {
            tr[i] = (h - l).max((h - pc).abs()).max((pc - l).abs());
        }
    }

    tr
}

/// Window-rebuilding ATR over the last `period` available true ranges.
pub fn atr_fallback(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let mut tr = true_range(bars);
    if let Some(first) = tr.first_mut() {
        *first = f64::NAN;
    }

    for i in 0..n {
        if tr[i].is_nan() {
            continue;
        }
        let window: Vec<f64> = tr[..=i]
            .iter()
            .rev()
            .filter(|v| !v.is_nan())
            .take(period)
            .copied()
            .collect();
        if window.len() == period {
            result[i] = window.iter().sum::<f64>() / period as f64;
        }
    }

    result
}
