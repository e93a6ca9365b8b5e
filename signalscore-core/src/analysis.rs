//! One-call analysis: pipeline, scorer and verdicts for a bar series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::currency::ConversionContext;
use crate::domain::{Bar, DatasetHash, IndicatorSnapshot, ScoreResult};
use crate::pipeline::{IndicatorPipeline, PipelineError};
use crate::scoring::{latest_pair, SignalScorer};
use crate::verdict::{PriceSummary, RiskLevel, SignalLabel, TrendStrength};

/// Everything a presentation layer needs for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub result: ScoreResult,
    pub label: SignalLabel,
    pub risk: RiskLevel,
    pub trend_strength: TrendStrength,
    /// Date of the bar that was scored; absent only for an empty series.
    pub scored_date: Option<NaiveDate>,
    pub price: Option<PriceSummary>,
    /// One snapshot per input bar, for charting.
    pub snapshots: Vec<IndicatorSnapshot>,
    pub dataset_hash: DatasetHash,
}

impl Analysis {
    /// Fixed report for an empty series.
    pub fn neutral(bars: &[Bar]) -> Self {
        let result = ScoreResult::neutral();
        Self {
            label: SignalLabel::from_score(result.score),
            result,
            risk: RiskLevel::Unknown,
            trend_strength: TrendStrength::Unknown,
            scored_date: None,
            price: None,
            snapshots: Vec::new(),
            dataset_hash: DatasetHash::of_bars(bars),
        }
    }

    /// Snapshot of the bar that was scored.
    pub fn latest_snapshot(&self) -> Option<&IndicatorSnapshot> {
        let date = self.scored_date?;
        self.snapshots.iter().rev().find(|s| s.date == date)
    }
}

/// Pipeline and scorer bundled for repeated use.
#[derive(Debug, Default)]
pub struct Analyzer {
    pipeline: IndicatorPipeline,
    scorer: SignalScorer,
}

impl Analyzer {
    pub fn new(pipeline: IndicatorPipeline, scorer: SignalScorer) -> Self {
        Self { pipeline, scorer }
    }

    pub fn scorer(&self) -> &SignalScorer {
        &self.scorer
    }

    /// Analyse an ascending bar series.
    ///
    /// An empty series gives the neutral report. A non-empty series with no
    /// usable close is `InsufficientData`.
    pub fn analyze(
        &self,
        bars: &[Bar],
        conversion: Option<&ConversionContext>,
    ) -> Result<Analysis, PipelineError> {
        if bars.is_empty() {
            debug!("empty bar series, returning neutral analysis");
            return Ok(Analysis::neutral(bars));
        }

        let snapshots = self.pipeline.compute(bars)?;
        let Some((latest, previous)) = latest_pair(bars) else {
            return Err(PipelineError::InsufficientData { bars: bars.len() });
        };
        let latest_bar = &bars[latest];
        let previous_bar = previous.map(|p| &bars[p]);
        let snapshot = &snapshots[latest];

        let result = self.scorer.score(latest_bar, previous_bar, snapshot, conversion);
        let analysis = Analysis {
            label: SignalLabel::from_score(result.score),
            risk: RiskLevel::classify(result.volatility, latest_bar.close),
            trend_strength: TrendStrength::classify(snapshot.adx_14),
            scored_date: Some(latest_bar.date),
            price: Some(PriceSummary::new(latest_bar, previous_bar, conversion)),
            dataset_hash: DatasetHash::of_bars(bars),
            result,
            snapshots,
        };
        info!(
            date = %latest_bar.date,
            score = analysis.result.score,
            label = %analysis.label,
            confidence = ?analysis.result.confidence,
            "analysis complete"
        );
        Ok(analysis)
    }
}

/// Analyse with the standard pipeline and rule set.
pub fn analyze(
    bars: &[Bar],
    conversion: Option<&ConversionContext>,
) -> Result<Analysis, PipelineError> {
    Analyzer::default().analyze(bars, conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfidenceLevel;
    use crate::indicators::make_bars;

    #[test]
    fn empty_series_is_neutral() {
        let analysis = analyze(&[], None).unwrap();
        assert_eq!(analysis.result, ScoreResult::neutral());
        assert_eq!(analysis.label, SignalLabel::Neutral);
        assert!(analysis.snapshots.is_empty());
        assert!(analysis.price.is_none());
    }

    #[test]
    fn no_usable_close_is_an_error() {
        let mut bars = make_bars(&[1.0, 2.0]);
        bars.iter_mut().for_each(|b| b.close = f64::NAN);
        assert_eq!(
            analyze(&bars, None).unwrap_err(),
            PipelineError::InsufficientData { bars: 2 }
        );
    }

    #[test]
    fn short_series_is_scored_with_guards() {
        let bars = make_bars(&[100.0; 5]);
        let analysis = analyze(&bars, None).unwrap();
        assert_eq!(analysis.snapshots.len(), 5);
        assert_eq!(analysis.result.score, 50);
        assert_eq!(analysis.result.confidence, ConfidenceLevel::Low);
        assert!(analysis.result.reasons.iter().all(|r| r.starts_with("Insufficient data")));
        assert_eq!(analysis.trend_strength, TrendStrength::Unknown);
        assert_eq!(analysis.risk, RiskLevel::Unknown);
    }

    #[test]
    fn scores_last_usable_bar() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let mut bars = make_bars(&closes);
        bars[39].close = f64::NAN;
        let analysis = analyze(&bars, None).unwrap();
        let price = analysis.price.as_ref().unwrap();
        assert_eq!(price.last_close, 138.0);
        assert_eq!(price.previous_close, Some(137.0));
        assert_eq!(analysis.scored_date, Some(bars[38].date));
        assert_eq!(analysis.latest_snapshot().unwrap().date, bars[38].date);
    }

    #[test]
    fn custom_scorer_is_used() {
        use crate::scoring::{RuleContext, RuleOutcome, ScoreState, ScoringRule};

        struct AlwaysBearish;
        impl ScoringRule for AlwaysBearish {
            fn name(&self) -> &str {
                "always_bearish"
            }
            fn evaluate(&self, _ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
                state.delta -= 40;
                RuleOutcome::new(state, "forced bearish")
            }
        }

        let analyzer = Analyzer::new(
            IndicatorPipeline::new(),
            SignalScorer::with_rules(vec![Box::new(AlwaysBearish)]),
        );
        assert_eq!(analyzer.scorer().rule_names(), vec!["always_bearish"]);

        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let analysis = analyzer.analyze(&make_bars(&closes), None).unwrap();
        assert_eq!(analysis.result.score, 10);
        assert_eq!(analysis.result.reasons, vec!["forced bearish".to_string()]);
        assert_eq!(analysis.label, SignalLabel::StrongSell);
        assert_eq!(analysis.snapshots.len(), 30);
    }

    #[test]
    fn analysis_serializes() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let ctx = ConversionContext::new(16_000.0, false).unwrap();
        let analysis = analyze(&bars, Some(&ctx)).unwrap();
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("\"dataset_hash\""));
        assert!(json.contains("\"ema_200\":null"));
        let back: Analysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back.result.score, analysis.result.score);
        assert_eq!(back.snapshots.len(), 3);
    }
}
