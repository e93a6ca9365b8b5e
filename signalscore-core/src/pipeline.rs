//! Indicator pipeline orchestration.
//!
//! Turns a bar series into one `IndicatorSnapshot` per bar. Every indicator is
//! computed once over the whole series; the series are then zipped into
//! snapshots by position.
//!
//! Bars with unusable inputs are filtered out before an indicator sees them
//! and the results are scattered back to their original positions, so a
//! missing value only blanks the positions that depend on it.

use thiserror::Error;
use tracing::debug;

use crate::domain::{Bar, IndicatorSnapshot, Reading};
use crate::indicators::{atr::atr_fallback, Adx, Atr, Bollinger, Ema, Indicator, Macd, Rsi, Sma, Volatility};

pub const EMA_SHORT: usize = 20;
pub const EMA_MEDIUM: usize = 50;
pub const EMA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;
pub const ADX_PERIOD: usize = 14;
pub const VOLATILITY_WINDOW: usize = 30;
pub const ATR_PERIOD: usize = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("insufficient data: no usable close price in {bars} bars")]
    InsufficientData { bars: usize },
}

/// Which ATR implementation produced the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtrPath {
    Primary,
    Fallback,
}

/// Bars kept by a predicate, remembering where each came from.
struct Subset {
    positions: Vec<usize>,
    bars: Vec<Bar>,
    len: usize,
}

impl Subset {
    fn new(bars: &[Bar], keep: fn(&Bar) -> bool) -> Self {
        let positions: Vec<usize> = (0..bars.len()).filter(|&i| keep(&bars[i])).collect();
        let kept = positions.iter().map(|&i| bars[i]).collect();
        Self {
            positions,
            bars: kept,
            len: bars.len(),
        }
    }

    fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    fn compute(&self, indicator: &dyn Indicator) -> Vec<Reading> {
        let series = indicator.compute(&self.bars);
        debug_assert_eq!(
            series.len(),
            self.bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            self.bars.len()
        );
        let mut out = vec![Reading::Unavailable; self.len];
        for (&pos, &value) in self.positions.iter().zip(&series) {
            out[pos] = Reading::from_raw(value);
        }
        out
    }
}

/// Computes the fixed indicator set for a bar series.
#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    atr: Atr,
}

impl Default for IndicatorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPipeline {
    pub fn new() -> Self {
        Self {
            atr: Atr::new(ATR_PERIOD),
        }
    }

    /// Compute one snapshot per bar.
    ///
    /// Fails only when no bar carries a usable close. Bars must be in
    /// ascending date order; gaps between dates are fine.
    pub fn compute(&self, bars: &[Bar]) -> Result<Vec<IndicatorSnapshot>, PipelineError> {
        let closes = Subset::new(bars, Bar::has_close);
        if closes.is_empty() {
            return Err(PipelineError::InsufficientData { bars: bars.len() });
        }
        let ranges = Subset::new(bars, Bar::has_range);
        debug!(
            bars = bars.len(),
            usable_closes = closes.bars.len(),
            usable_ranges = ranges.bars.len(),
            "computing indicators"
        );

        let ema_20 = closes.compute(&Ema::new(EMA_SHORT));
        let ema_50 = closes.compute(&Ema::new(EMA_MEDIUM));
        let ema_200 = closes.compute(&Ema::new(EMA_LONG));
        let rsi_14 = closes.compute(&Rsi::new(RSI_PERIOD));
        let macd = closes.compute(&Macd::line(MACD_FAST, MACD_SLOW, MACD_SIGNAL));
        let macd_signal = closes.compute(&Macd::signal(MACD_FAST, MACD_SLOW, MACD_SIGNAL));
        let bb_upper = closes.compute(&Bollinger::upper(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER));
        let bb_middle = closes.compute(&Sma::new(BOLLINGER_PERIOD));
        let bb_lower = closes.compute(&Bollinger::lower(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER));
        let volatility_30 = closes.compute(&Volatility::new(VOLATILITY_WINDOW));
        let adx_14 = ranges.compute(&Adx::new(ADX_PERIOD));
        let (atr_14, path) = self.atr_series(bars);
        debug!(?path, "atr computed");

        let snapshots = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorSnapshot {
                date: bar.date,
                ema_20: ema_20[i],
                ema_50: ema_50[i],
                ema_200: ema_200[i],
                rsi_14: rsi_14[i],
                macd: macd[i],
                macd_signal: macd_signal[i],
                bb_upper: bb_upper[i],
                bb_middle: bb_middle[i],
                bb_lower: bb_lower[i],
                adx_14: adx_14[i],
                volatility_30: volatility_30[i],
                atr_14: atr_14[i],
            })
            .collect();

        Ok(snapshots)
    }

    /// ATR over the full series: running-sum path first, window rebuild when it declines.
    pub fn atr_series(&self, bars: &[Bar]) -> (Vec<Reading>, AtrPath) {
        let (raw, path) = match self.atr.try_compute(bars) {
            Some(series) => (series, AtrPath::Primary),
            None => {
                debug!("true range series has gaps, rebuilding ATR windows");
                (atr_fallback(bars, self.atr.period()), AtrPath::Fallback)
            }
        };
        (raw.into_iter().map(Reading::from_raw).collect(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, Indicator};

    fn rising(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
        make_bars(&closes)
    }

    #[test]
    fn snapshot_series_matches_bar_count() {
        let bars = rising(250);
        let snaps = IndicatorPipeline::new().compute(&bars).unwrap();
        assert_eq!(snaps.len(), bars.len());
        assert_eq!(snaps[0].date, bars[0].date);
        assert_eq!(snaps[249].date, bars[249].date);
    }

    #[test]
    fn warmup_positions_are_unavailable() {
        let bars = rising(250);
        let snaps = IndicatorPipeline::new().compute(&bars).unwrap();
        assert!(!snaps[198].ema_200.is_available());
        assert!(snaps[199].ema_200.is_available());
        assert!(!snaps[13].rsi_14.is_available());
        assert!(snaps[14].rsi_14.is_available());
        assert!(!snaps[13].atr_14.is_available());
        assert!(snaps[14].atr_14.is_available());
        assert!(!snaps[28].volatility_30.is_available());
        assert!(snaps[29].volatility_30.is_available());
        assert!(!snaps[26].adx_14.is_available());
        assert!(snaps[27].adx_14.is_available());
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = IndicatorPipeline::new().compute(&[]).unwrap_err();
        assert_eq!(err, PipelineError::InsufficientData { bars: 0 });
    }

    #[test]
    fn all_missing_closes_is_insufficient() {
        let mut bars = make_bars(&[10.0, 11.0]);
        for bar in &mut bars {
            bar.close = f64::NAN;
        }
        assert!(IndicatorPipeline::new().compute(&bars).is_err());
    }

    #[test]
    fn missing_range_blanks_only_its_position() {
        let mut bars = rising(80);
        bars[60].high = f64::NAN;
        let snaps = IndicatorPipeline::new().compute(&bars).unwrap();
        assert!(!snaps[60].adx_14.is_available());
        assert!(!snaps[60].atr_14.is_available());
        assert!(snaps[59].adx_14.is_available());
        assert!(snaps[61].adx_14.is_available());
        assert!(snaps[61].atr_14.is_available());
        // Close-derived fields are untouched.
        assert!(snaps[60].rsi_14.is_available());
    }

    #[test]
    fn missing_close_blanks_only_its_position() {
        let mut bars = rising(80);
        bars[50].close = f64::NAN;
        let snaps = IndicatorPipeline::new().compute(&bars).unwrap();
        assert!(!snaps[50].ema_20.is_available());
        assert!(snaps[51].ema_20.is_available());
        assert!(snaps[51].rsi_14.is_available());
    }

    #[test]
    fn atr_path_selection() {
        let pipeline = IndicatorPipeline::new();
        let mut bars = rising(40);
        assert_eq!(pipeline.atr_series(&bars).1, AtrPath::Primary);
        bars[20].low = f64::NAN;
        assert_eq!(pipeline.atr_series(&bars).1, AtrPath::Fallback);
    }

    #[test]
    fn middle_band_is_sma() {
        let bars = rising(40);
        let snaps = IndicatorPipeline::new().compute(&bars).unwrap();
        let sma = Sma::new(BOLLINGER_PERIOD).compute(&bars);
        assert_eq!(snaps[39].bb_middle, Reading::Available(sma[39]));
    }
}
