//! MACD — moving average convergence/divergence.
//!
//! Line: EMA(fast) - EMA(slow) of close.
//! Signal: EMA(signal) of the MACD line, seeded at the line's first value.
//! Lookback: slow - 1 for the line, slow + signal - 2 for the signal line.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;

/// Which MACD series to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(line: MacdLine, fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        let label = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(MacdLine::Macd, fast, slow, signal)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(MacdLine::Signal, fast, slow, signal)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        // NaN - x stays NaN, so the line inherits the slow EMA's warmup.
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        match self.line {
            MacdLine::Macd => line,
            MacdLine::Signal => ema_of_series(&line, self.signal),
        }
    }
}
