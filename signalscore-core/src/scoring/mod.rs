//! Signal scoring — folds the latest indicator snapshot into one explainable score.
//!
//! The score is built from an ordered list of rules. Each rule receives the
//! running `ScoreState` produced by the rules before it and returns an updated
//! state plus its reasons. Order matters: the trend-strength rule reads the
//! delta accumulated so far.
//!
//! Rules never see portfolio state or future bars; they read one snapshot,
//! the latest close and the previous close.

pub mod rules;

use tracing::debug;

use crate::currency::{format_money, ConversionContext};
use crate::domain::{Bar, ConfidenceLevel, IndicatorSnapshot, LocalFigures, ScoreResult};

pub use rules::{
    BollingerBreakout, LongTermTrend, MacdCross, MediumTermCross, Momentum, TrendStrength,
    VolatilityCommentary,
};

/// Running accumulator threaded through the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    /// Signed offset from the neutral score of 50.
    pub delta: i32,
    pub confidence_points: u32,
}

impl ScoreState {
    /// `clamp(0, 100, 50 + delta)`.
    pub fn final_score(self) -> u8 {
        (50 + self.delta).clamp(0, 100) as u8
    }
}

/// What one rule did: the new state and the reasons it appended.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub state: ScoreState,
    pub reasons: Vec<String>,
}

impl RuleOutcome {
    pub fn new(state: ScoreState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reasons: vec![reason.into()],
        }
    }
}

/// Inputs visible to every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub close: f64,
    pub previous_close: Option<f64>,
    pub snapshot: &'a IndicatorSnapshot,
    pub conversion: Option<&'a ConversionContext>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        latest: &Bar,
        previous: Option<&Bar>,
        snapshot: &'a IndicatorSnapshot,
        conversion: Option<&'a ConversionContext>,
    ) -> Self {
        Self {
            close: latest.close,
            previous_close: previous.map(|b| b.close).filter(|c| c.is_finite()),
            snapshot,
            conversion,
        }
    }

    /// Render a base-currency amount, with the local equivalent when converting.
    pub fn money(&self, value: f64) -> String {
        format_money(value, self.conversion)
    }
}

/// One step of the scoring policy.
pub trait ScoringRule: Send + Sync {
    /// Short identifier used in logs (e.g., "long_term_trend").
    fn name(&self) -> &str;

    /// Read the context and the state so far; return the next state and reasons.
    ///
    /// A rule whose inputs are unavailable must return the state unchanged and
    /// explain why in its reasons.
    fn evaluate(&self, ctx: &RuleContext<'_>, state: ScoreState) -> RuleOutcome;
}

/// The seven rules in evaluation order.
pub fn standard_rules() -> Vec<Box<dyn ScoringRule>> {
    vec![
        Box::new(LongTermTrend),
        Box::new(MediumTermCross),
        Box::new(Momentum),
        Box::new(MacdCross),
        Box::new(BollingerBreakout),
        Box::new(TrendStrength),
        Box::new(VolatilityCommentary),
    ]
}

/// Applies an ordered rule list to the latest bar.
pub struct SignalScorer {
    rules: Vec<Box<dyn ScoringRule>>,
}

impl Default for SignalScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalScorer")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl SignalScorer {
    pub fn new() -> Self {
        Self::with_rules(standard_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn ScoringRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Fold every rule over the context, starting from a zero state.
    pub fn fold(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let start = RuleOutcome {
            state: ScoreState::default(),
            reasons: Vec::new(),
        };
        self.rules.iter().fold(start, |mut acc, rule| {
            let outcome = rule.evaluate(ctx, acc.state);
            debug!(
                rule = rule.name(),
                delta = outcome.state.delta,
                confidence_points = outcome.state.confidence_points,
                "rule evaluated"
            );
            acc.reasons.extend(outcome.reasons);
            acc.state = outcome.state;
            acc
        })
    }

    /// Score the latest bar against its snapshot.
    ///
    /// Currency conversion only changes how amounts are written in reasons and
    /// adds `local`; score and confidence come from base-currency values.
    pub fn score(
        &self,
        latest: &Bar,
        previous: Option<&Bar>,
        snapshot: &IndicatorSnapshot,
        conversion: Option<&ConversionContext>,
    ) -> ScoreResult {
        let ctx = RuleContext::new(latest, previous, snapshot, conversion);
        let outcome = self.fold(&ctx);

        let volatility = snapshot.volatility_30.or_zero();
        let atr = snapshot.atr_14.or_zero();
        let local = conversion.map(|c| LocalFigures {
            currency: c.currency().map(str::to_string),
            volatility: c.to_local(volatility),
            atr: c.to_local(atr),
        });

        ScoreResult {
            score: outcome.state.final_score(),
            reasons: outcome.reasons,
            confidence: ConfidenceLevel::from_points(outcome.state.confidence_points),
            volatility,
            atr,
            local,
        }
    }

    /// Score the last bar of a series that has already been through the pipeline.
    ///
    /// The latest bar is the last one with a usable close; the previous bar is
    /// the usable-close bar before it. An empty series gives the neutral result.
    pub fn score_series(
        &self,
        bars: &[Bar],
        snapshots: &[IndicatorSnapshot],
        conversion: Option<&ConversionContext>,
    ) -> ScoreResult {
        let Some((latest, previous)) = latest_pair(bars) else {
            return ScoreResult::neutral();
        };
        match snapshots.get(latest) {
            Some(snapshot) => self.score(
                &bars[latest],
                previous.map(|p| &bars[p]),
                snapshot,
                conversion,
            ),
            None => ScoreResult::neutral(),
        }
    }
}

/// Indices of the last usable-close bar and the usable-close bar before it.
pub fn latest_pair(bars: &[Bar]) -> Option<(usize, Option<usize>)> {
    let mut usable = (0..bars.len()).rev().filter(|&i| bars[i].has_close());
    let latest = usable.next()?;
    Some((latest, usable.next()))
}
