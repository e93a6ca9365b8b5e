//! ScoreResult — the scorer's verdict for the latest bar.

use serde::{Deserialize, Serialize};

/// Reason emitted when there is no bar series to analyse.
pub const DATA_UNAVAILABLE: &str = "data unavailable";

/// Corroboration tier derived from how many rules agreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// >= 5 points is High, 3-4 Medium, anything less Low.
    pub fn from_points(points: u32) -> Self {
        match points {
            p if p >= 5 => ConfidenceLevel::High,
            3 | 4 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }
}

/// Risk figures re-expressed in the caller's local currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFigures {
    pub currency: Option<String>,
    pub volatility: f64,
    pub atr: f64,
}

/// Signal strength, ordered rationale, confidence and risk figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0..=100, 50 is neutral.
    pub score: u8,
    /// One entry per rule outcome, in rule evaluation order.
    pub reasons: Vec<String>,
    pub confidence: ConfidenceLevel,
    /// 30-bar close standard deviation, 0 when unavailable.
    pub volatility: f64,
    /// 14-bar average true range, 0 when unavailable.
    pub atr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalFigures>,
}

impl ScoreResult {
    /// Fixed result for an absent or empty bar series.
    pub fn neutral() -> Self {
        Self {
            score: 50,
            reasons: vec![DATA_UNAVAILABLE.to_string()],
            confidence: ConfidenceLevel::Low,
            volatility: 0.0,
            atr: 0.0,
            local: None,
        }
    }
}
