//! Human-facing verdicts derived from a score and the latest snapshot.
//!
//! None of these feed back into the score; they only bucket it for display.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::currency::ConversionContext;
use crate::domain::{Bar, Reading};

/// Action label for a 0..=100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalLabel {
    StrongBuy,
    Buy,
    Neutral,
    StrongSell,
}

impl SignalLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 75 => SignalLabel::StrongBuy,
            s if s >= 55 => SignalLabel::Buy,
            s if s <= 25 => SignalLabel::StrongSell,
            _ => SignalLabel::Neutral,
        }
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalLabel::StrongBuy => "STRONG BUY",
            SignalLabel::Buy => "BUY (ACCUMULATE)",
            SignalLabel::Neutral => "NEUTRAL / WAIT",
            SignalLabel::StrongSell => "STRONG SELL",
        };
        f.write_str(s)
    }
}

/// Volatility relative to the last close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Under 2% of close is low, under 5% medium. Zero volatility means unknown.
    pub fn classify(volatility: f64, last_close: f64) -> Self {
        if volatility == 0.0 || !volatility.is_finite() {
            RiskLevel::Unknown
        } else if volatility < last_close * 0.02 {
            RiskLevel::Low
        } else if volatility < last_close * 0.05 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Unknown => "n/a",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// ADX tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    Unknown,
    Weak,
    Moderate,
    Strong,
}

impl TrendStrength {
    pub fn classify(adx: Reading) -> Self {
        match adx.value() {
            None => TrendStrength::Unknown,
            Some(v) if v < 25.0 => TrendStrength::Weak,
            Some(v) if v < 50.0 => TrendStrength::Moderate,
            Some(_) => TrendStrength::Strong,
        }
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendStrength::Unknown => "n/a",
            TrendStrength::Weak => "weak (<25)",
            TrendStrength::Moderate => "moderate (25-50)",
            TrendStrength::Strong => "strong (>50)",
        };
        f.write_str(s)
    }
}

/// Latest price with its one-bar change and optional local equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub last_close: f64,
    pub previous_close: Option<f64>,
    /// Percent change from the previous close, when there is one.
    pub change_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
}

impl PriceSummary {
    pub fn new(latest: &Bar, previous: Option<&Bar>, conversion: Option<&ConversionContext>) -> Self {
        let previous_close = previous.map(|b| b.close);
        let change_pct = previous_close
            .filter(|p| *p != 0.0)
            .map(|p| (latest.close - p) / p * 100.0);
        Self {
            last_close: latest.close,
            previous_close,
            change_pct,
            local_price: conversion.map(|c| c.to_local(latest.close)),
            unit_label: conversion.map(|c| c.unit_label().to_string()),
        }
    }
}
