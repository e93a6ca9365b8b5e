//! Per-bar indicator values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One indicator value at one bar position.
///
/// Serializes as a nullable number so charting consumers see `null` for
/// warmup positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Reading {
    Available(f64),
    #[default]
    Unavailable,
}

impl Reading {
    /// Wrap a raw series value; NaN and infinities mean "not yet available".
    pub fn from_raw(value: f64) -> Self {
        if value.is_finite() {
            Reading::Available(value)
        } else {
            Reading::Unavailable
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Available(v) => Some(v),
            Reading::Unavailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Reading::Available(_))
    }

    /// Value or zero, for the risk figures that are reported as 0 when unknown.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Reading::Unavailable, Reading::from_raw)
    }
}

impl From<Reading> for Option<f64> {
    fn from(reading: Reading) -> Self {
        reading.value()
    }
}

/// Indicator values for a single bar, aligned by position with the bar series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub ema_20: Reading,
    pub ema_50: Reading,
    pub ema_200: Reading,
    pub rsi_14: Reading,
    pub macd: Reading,
    pub macd_signal: Reading,
    pub bb_upper: Reading,
    pub bb_middle: Reading,
    pub bb_lower: Reading,
    pub adx_14: Reading,
    pub volatility_30: Reading,
    pub atr_14: Reading,
}

impl IndicatorSnapshot {
    /// A snapshot with every field unavailable.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ema_20: Reading::Unavailable,
            ema_50: Reading::Unavailable,
            ema_200: Reading::Unavailable,
            rsi_14: Reading::Unavailable,
            macd: Reading::Unavailable,
            macd_signal: Reading::Unavailable,
            bb_upper: Reading::Unavailable,
            bb_middle: Reading::Unavailable,
            bb_lower: Reading::Unavailable,
            adx_14: Reading::Unavailable,
            volatility_30: Reading::Unavailable,
            atr_14: Reading::Unavailable,
        }
    }
}
