//! Bar — one trading day of price history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLC bar.
///
/// Missing prices are carried as `f64::NAN` (a provider row with an empty
/// high/low cell, for example). Indicators treat a non-finite field as
/// "not available for this position" rather than failing the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<u64>,
}

impl Bar {
    /// True when the close can feed close-derived indicators.
    pub fn has_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }

    /// True when high, low and close are all usable (range-derived indicators).
    pub fn has_range(&self) -> bool {
        self.has_close() && self.high.is_finite() && self.low.is_finite()
    }

    /// Basic OHLC sanity check for fully populated bars.
    pub fn is_sane(&self) -> bool {
        if !self.has_range() || !self.open.is_finite() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.low > 0.0
    }
}

/// Errors raised while validating a raw bar series.
///
/// `row` is the zero-based index of the offending bar.
#[derive(Debug, Error)]
pub enum BarError {
    #[error("row {row}: {field} must be positive and finite, got {value}")]
    NonPositive {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("row {row}: OHLC values are inconsistent (high below low or outside open/close)")]
    Inconsistent { row: usize },

    #[error("row {row}: date {date} is not after previous date {previous}")]
    Unordered {
        row: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that bars are in strictly ascending date order (at most one bar per date).
pub fn check_ascending(bars: &[Bar]) -> Result<(), BarError> {
    for (row, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(BarError::Unordered {
                row: row + 1,
                previous: pair[0].date,
                date: pair[1].date,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: Some(50_000),
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn missing_high_keeps_close_usable() {
        let mut bar = sample_bar();
        bar.high = f64::NAN;
        assert!(bar.has_close());
        assert!(!bar.has_range());
        assert!(!bar.is_sane());
    }

    #[test]
    fn non_positive_close_is_unusable() {
        let mut bar = sample_bar();
        bar.close = 0.0;
        assert!(!bar.has_close());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn ascending_check_rejects_duplicate_dates() {
        let first = sample_bar();
        let second = sample_bar();
        let err = check_ascending(&[first, second]).unwrap_err();
        assert!(matches!(err, BarError::Unordered { row: 1, .. }));
    }

    #[test]
    fn ascending_check_accepts_gaps() {
        let first = sample_bar();
        let mut second = sample_bar();
        second.date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert!(check_ascending(&[first, second]).is_ok());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
