//! The seven scoring rules, in evaluation order.
//!
//! | Rule                  | Reads                  | Delta          | Points |
//! |-----------------------|------------------------|----------------|--------|
//! | LongTermTrend         | close, EMA200, EMA50   | +25 / -25      | +1 when EMA50 confirms |
//! | MediumTermCross       | EMA50, EMA200          | +15 / -10      | none   |
//! | Momentum              | RSI14                  | +35 / -25 / +10 / +5 | +1 at extremes |
//! | MacdCross             | MACD, signal           | +20 / -20      | +1     |
//! | BollingerBreakout     | close, bands           | -30 / +30      | +1     |
//! | TrendStrength         | ADX14, running delta   | amplification  | +1 when amplified |
//! | VolatilityCommentary  | ATR14, previous close  | none           | none   |

use super::{RuleContext, RuleOutcome, ScoreState, ScoringRule};
use crate::pipeline::{ADX_PERIOD, ATR_PERIOD, RSI_PERIOD};

/// ADX above this marks a trending market.
pub const ADX_TRENDING: f64 = 25.0;
/// Delta magnitude above which a trending market amplifies the signal.
pub const AMPLIFY_DELTA: i32 = 20;
pub const AMPLIFY_FACTOR: f64 = 1.1;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_MIDLINE: f64 = 50.0;

fn insufficient(state: ScoreState, what: &str) -> RuleOutcome {
    RuleOutcome::new(state, format!("Insufficient data for {what}."))
}

/// Price versus EMA200, confirmed by EMA50.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongTermTrend;

impl ScoringRule for LongTermTrend {
    fn name(&self) -> &str {
        "long_term_trend"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
        let Some(ema_200) = ctx.snapshot.ema_200.value() else {
            return insufficient(state, "EMA200 long-term trend analysis");
        };
        let ema_50 = ctx.snapshot.ema_50.value();
        let gap = (ctx.close - ema_200) / ema_200 * 100.0;
        let bullish = ctx.close > ema_200;

        let mut reason = if bullish {
            state.delta += 25;
            format!(
                "Price {} is {:.1}% above the long-term trend line EMA200 ({}). Market is bullish.",
                ctx.money(ctx.close),
                gap,
                ctx.money(ema_200)
            )
        } else {
            state.delta -= 25;
            format!(
                "Price {} is {:.1}% below the long-term trend line EMA200 ({}). Market is bearish.",
                ctx.money(ctx.close),
                gap.abs(),
                ctx.money(ema_200)
            )
        };

        match ema_50 {
            Some(e) if bullish && e > ema_200 => {
                state.confidence_points += 1;
                reason.push_str(" Confirmed: EMA50 is also above EMA200.");
            }
            Some(e) if !bullish && e < ema_200 => {
                state.confidence_points += 1;
                reason.push_str(" Confirmed: EMA50 is also below EMA200.");
            }
            _ => {}
        }
        RuleOutcome::new(state, reason)
    }
}

/// EMA50 versus EMA200: golden cross or death cross.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediumTermCross;

impl ScoringRule for MediumTermCross {
    fn name(&self) -> &str {
        "medium_term_cross"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
        let (Some(ema_50), Some(ema_200)) =
            (ctx.snapshot.ema_50.value(), ctx.snapshot.ema_200.value())
        else {
            return insufficient(state, "the EMA50/EMA200 cross");
        };

        let reason = if ema_50 > ema_200 {
            state.delta += 15;
            "Golden Cross confirmed (EMA50 above EMA200). Medium-term trend is strong."
        } else if ema_50 < ema_200 {
            state.delta -= 10;
            "Death Cross (EMA50 below EMA200). Medium-term trend is weak."
        } else {
            "EMA50 and EMA200 are level. No medium-term cross."
        };
        RuleOutcome::new(state, reason)
    }
}

/// RSI zones: oversold, overbought, accumulation, growth.
#[derive(Debug, Clone, Copy, Default)]
pub struct Momentum;

impl ScoringRule for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
        let Some(rsi) = ctx.snapshot.rsi_14.value() else {
            return insufficient(state, &format!("RSI {RSI_PERIOD} momentum"));
        };

        let reason = if rsi < RSI_OVERSOLD {
            state.delta += 35;
            state.confidence_points += 1;
            format!("RSI {rsi:.1} is oversold. Strong bounce potential.")
        } else if rsi > RSI_OVERBOUGHT {
            state.delta -= 25;
            state.confidence_points += 1;
            format!("RSI {rsi:.1} is overbought. Pullback risk is high.")
        } else if rsi <= RSI_MIDLINE {
            state.delta += 10;
            format!("RSI {rsi:.1} is in the accumulation zone.")
        } else {
            state.delta += 5;
            format!("RSI {rsi:.1} is in the growth zone.")
        };
        RuleOutcome::new(state, reason)
    }
}

/// MACD line versus its signal line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacdCross;

impl ScoringRule for MacdCross {
    fn name(&self) -> &str {
        "macd_cross"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
        let (Some(macd), Some(signal)) =
            (ctx.snapshot.macd.value(), ctx.snapshot.macd_signal.value())
        else {
            return insufficient(state, "the MACD cross");
        };

        state.confidence_points += 1;
        let reason = if macd > signal {
            state.delta += 20;
            format!("MACD {macd:.2} is above its signal line {signal:.2}. Bullish momentum.")
        } else {
            state.delta -= 20;
            format!("MACD {macd:.2} is below its signal line {signal:.2}. Bearish momentum.")
        };
        RuleOutcome::new(state, reason)
    }
}

/// Close outside the Bollinger Bands.
#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerBreakout;

impl ScoringRule for BollingerBreakout {
    fn name(&self) -> &str {
        "bollinger_breakout"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
        let (Some(upper), Some(lower)) =
            (ctx.snapshot.bb_upper.value(), ctx.snapshot.bb_lower.value())
        else {
            return insufficient(state, "the Bollinger Bands");
        };

        let reason = if ctx.close > upper {
            state.delta -= 30;
            state.confidence_points += 1;
            format!(
                "Price broke above the upper Bollinger Band ({}). Overextended, correction likely.",
                ctx.money(upper)
            )
        } else if ctx.close < lower {
            state.delta += 30;
            state.confidence_points += 1;
            format!(
                "Price broke below the lower Bollinger Band ({}). Statistically cheap.",
                ctx.money(lower)
            )
        } else {
            format!(
                "Price is inside the Bollinger Bands ({} to {}).",
                ctx.money(lower),
                ctx.money(upper)
            )
        };
        RuleOutcome::new(state, reason)
    }
}

/// ADX trend strength; amplifies a decided signal in a trending market.
///
/// Amplification rebases the delta: `clamp(0, 100, round((50 + delta) * 1.1))`
/// becomes the new delta, which the final `50 + delta` then offsets again.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendStrength;

impl ScoringRule for TrendStrength {
    fn name(&self) -> &str {
        "trend_strength"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, mut state: ScoreState) -> RuleOutcome {
        let Some(adx) = ctx.snapshot.adx_14.value() else {
            return insufficient(state, &format!("ADX {ADX_PERIOD} trend strength"));
        };

        let reason = if adx > ADX_TRENDING && state.delta.abs() > AMPLIFY_DELTA {
            let amplified = (f64::from(50 + state.delta) * AMPLIFY_FACTOR).round();
            state.delta = amplified.clamp(0.0, 100.0) as i32;
            state.confidence_points += 1;
            format!("ADX {adx:.1}: very strong trend. Signal amplified.")
        } else if adx > ADX_TRENDING {
            format!("ADX {adx:.1}: moderate trend. Confirm with other signals.")
        } else {
            format!("ADX {adx:.1}: weak trend. Signal may be unreliable.")
        };
        RuleOutcome::new(state, reason)
    }
}

/// ATR commentary for stop-loss sizing. Never moves the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityCommentary;

impl ScoringRule for VolatilityCommentary {
    fn name(&self) -> &str {
        "volatility_commentary"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>, state: ScoreState) -> RuleOutcome {
        let Some(atr) = ctx.snapshot.atr_14.value() else {
            return insufficient(state, "ATR: volatility data unavailable");
        };
        if atr == 0.0 {
            return RuleOutcome::new(state, "Volatility data unavailable (ATR is zero).");
        }

        let mut reasons = Vec::with_capacity(2);
        if let Some(previous) = ctx.previous_close {
            let moved = (ctx.close - previous).abs();
            if moved > atr {
                reasons.push(format!(
                    "Price moved {} versus an average range of {}: high activity.",
                    ctx.money(moved),
                    ctx.money(atr)
                ));
            } else if moved < 0.5 * atr {
                reasons.push(format!(
                    "Price moved {} versus an average range of {}: consolidation.",
                    ctx.money(moved),
                    ctx.money(atr)
                ));
            }
        }
        reasons.push(format!(
            "Current volatility (ATR {ATR_PERIOD}d): {}. Use it for stop-loss sizing.",
            ctx.money(atr)
        ));
        RuleOutcome { state, reasons }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IndicatorSnapshot, Reading};
    use chrono::NaiveDate;

    fn snap() -> IndicatorSnapshot {
        IndicatorSnapshot::empty(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
    }

    fn ctx(close: f64, snapshot: &IndicatorSnapshot) -> RuleContext<'_> {
        RuleContext {
            close,
            previous_close: None,
            snapshot,
            conversion: None,
        }
    }

    fn start() -> ScoreState {
        ScoreState::default()
    }

    #[test]
    fn long_term_bullish_with_confirmation() {
        let mut s = snap();
        s.ema_200 = Reading::Available(100.0);
        s.ema_50 = Reading::Available(105.0);
        let out = LongTermTrend.evaluate(&ctx(110.0, &s), start());
        assert_eq!(out.state, ScoreState { delta: 25, confidence_points: 1 });
        assert_eq!(out.reasons.len(), 1);
        assert!(out.reasons[0].contains("10.0% above"));
        assert!(out.reasons[0].contains("bullish"));
        assert!(out.reasons[0].contains("Confirmed"));
    }

    #[test]
    fn long_term_bearish_confirmation() {
        let mut s = snap();
        s.ema_200 = Reading::Available(100.0);
        s.ema_50 = Reading::Available(95.0);
        let out = LongTermTrend.evaluate(&ctx(90.0, &s), start());
        assert_eq!(out.state, ScoreState { delta: -25, confidence_points: 1 });
        assert!(out.reasons[0].contains("10.0% below"));
        assert!(out.reasons[0].contains("bearish"));
        assert!(out.reasons[0].contains("also below"));

        s.ema_50 = Reading::Available(102.0);
        let out = LongTermTrend.evaluate(&ctx(90.0, &s), start());
        assert_eq!(out.state, ScoreState { delta: -25, confidence_points: 0 });
        assert!(!out.reasons[0].contains("Confirmed"));
    }

    #[test]
    fn long_term_close_at_ema_is_bearish() {
        let mut s = snap();
        s.ema_200 = Reading::Available(100.0);
        let out = LongTermTrend.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.state.delta, -25);
    }

    #[test]
    fn long_term_missing_ema_is_guarded() {
        let s = snap();
        let out = LongTermTrend.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.state, start());
        assert!(out.reasons[0].starts_with("Insufficient data"));
    }

    #[test]
    fn cross_directions() {
        let mut s = snap();
        s.ema_200 = Reading::Available(100.0);

        s.ema_50 = Reading::Available(101.0);
        let golden = MediumTermCross.evaluate(&ctx(100.0, &s), start());
        assert_eq!(golden.state.delta, 15);
        assert!(golden.reasons[0].contains("Golden Cross"));

        s.ema_50 = Reading::Available(99.0);
        let death = MediumTermCross.evaluate(&ctx(100.0, &s), start());
        assert_eq!(death.state.delta, -10);
        assert!(death.reasons[0].contains("Death Cross"));

        s.ema_50 = Reading::Available(100.0);
        let level = MediumTermCross.evaluate(&ctx(100.0, &s), start());
        assert_eq!(level.state.delta, 0);
        assert_eq!(level.state.confidence_points, 0);
    }

    #[test]
    fn rsi_zones() {
        let cases = [
            (25.0, 35, 1, "oversold"),
            (75.0, -25, 1, "overbought"),
            (30.0, 10, 0, "accumulation"),
            (50.0, 10, 0, "accumulation"),
            (50.5, 5, 0, "growth"),
            (70.0, 5, 0, "growth"),
        ];
        for (rsi, delta, points, word) in cases {
            let mut s = snap();
            s.rsi_14 = Reading::Available(rsi);
            let out = Momentum.evaluate(&ctx(100.0, &s), start());
            assert_eq!(out.state.delta, delta, "rsi {rsi}");
            assert_eq!(out.state.confidence_points, points, "rsi {rsi}");
            assert!(out.reasons[0].contains(word), "rsi {rsi}: {}", out.reasons[0]);
        }
    }

    #[test]
    fn macd_always_adds_a_point() {
        let mut s = snap();
        s.macd = Reading::Available(1.0);
        s.macd_signal = Reading::Available(1.0);
        let out = MacdCross.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.state, ScoreState { delta: -20, confidence_points: 1 });

        s.macd = Reading::Available(1.5);
        let out = MacdCross.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.state, ScoreState { delta: 20, confidence_points: 1 });
    }

    #[test]
    fn macd_missing_signal_is_guarded() {
        let mut s = snap();
        s.macd = Reading::Available(1.0);
        let out = MacdCross.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.state, start());
    }

    #[test]
    fn bollinger_breakouts() {
        let mut s = snap();
        s.bb_upper = Reading::Available(110.0);
        s.bb_lower = Reading::Available(90.0);

        let above = BollingerBreakout.evaluate(&ctx(111.0, &s), start());
        assert_eq!(above.state, ScoreState { delta: -30, confidence_points: 1 });

        let below = BollingerBreakout.evaluate(&ctx(89.0, &s), start());
        assert_eq!(below.state, ScoreState { delta: 30, confidence_points: 1 });

        let on_band = BollingerBreakout.evaluate(&ctx(110.0, &s), start());
        assert_eq!(on_band.state, start());
        assert!(on_band.reasons[0].contains("inside"));
    }

    #[test]
    fn amplification_rebases_delta() {
        let mut s = snap();
        s.adx_14 = Reading::Available(30.0);
        let state = ScoreState { delta: 30, confidence_points: 2 };
        let out = TrendStrength.evaluate(&ctx(100.0, &s), state);
        // round((50 + 30) * 1.1) = 88
        assert_eq!(out.state, ScoreState { delta: 88, confidence_points: 3 });
        assert_eq!(out.state.final_score(), 100);
        assert!(out.reasons[0].contains("amplified"));
    }

    #[test]
    fn amplification_of_bearish_delta() {
        let mut s = snap();
        s.adx_14 = Reading::Available(40.0);
        let state = ScoreState { delta: -40, confidence_points: 0 };
        let out = TrendStrength.evaluate(&ctx(100.0, &s), state);
        // round(10 * 1.1) = 11, final 50 + 11 = 61
        assert_eq!(out.state.delta, 11);
        assert_eq!(out.state.final_score(), 61);

        let deep = ScoreState { delta: -90, confidence_points: 0 };
        assert_eq!(TrendStrength.evaluate(&ctx(100.0, &s), deep).state.delta, 0);
    }

    #[test]
    fn amplification_needs_decided_delta() {
        let mut s = snap();
        s.adx_14 = Reading::Available(30.0);
        let state = ScoreState { delta: 20, confidence_points: 0 };
        let out = TrendStrength.evaluate(&ctx(100.0, &s), state);
        assert_eq!(out.state, state);
        assert!(out.reasons[0].contains("moderate trend"));

        s.adx_14 = Reading::Available(25.0);
        let state = ScoreState { delta: 60, confidence_points: 0 };
        let out = TrendStrength.evaluate(&ctx(100.0, &s), state);
        assert_eq!(out.state, state);
        assert!(out.reasons[0].contains("weak trend"));
    }

    #[test]
    fn volatility_commentary_never_scores() {
        let mut s = snap();
        s.atr_14 = Reading::Available(2.0);
        let state = ScoreState { delta: 7, confidence_points: 2 };

        let mut busy = ctx(105.0, &s);
        busy.previous_close = Some(100.0);
        let out = VolatilityCommentary.evaluate(&busy, state);
        assert_eq!(out.state, state);
        assert_eq!(out.reasons.len(), 2);
        assert!(out.reasons[0].contains("high activity"));
        assert!(out.reasons[1].contains("ATR 14d"));

        let mut quiet = ctx(100.5, &s);
        quiet.previous_close = Some(100.0);
        let out = VolatilityCommentary.evaluate(&quiet, state);
        assert!(out.reasons[0].contains("consolidation"));

        let mut normal = ctx(101.5, &s);
        normal.previous_close = Some(100.0);
        assert_eq!(VolatilityCommentary.evaluate(&normal, state).reasons.len(), 1);

        let first_bar = ctx(100.0, &s);
        assert_eq!(VolatilityCommentary.evaluate(&first_bar, state).reasons.len(), 1);
    }

    #[test]
    fn zero_atr_is_reported() {
        let mut s = snap();
        s.atr_14 = Reading::Available(0.0);
        let out = VolatilityCommentary.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.reasons, vec!["Volatility data unavailable (ATR is zero)."]);
    }

    #[test]
    fn missing_atr_is_guarded() {
        let s = snap();
        let out = VolatilityCommentary.evaluate(&ctx(100.0, &s), start());
        assert_eq!(out.reasons.len(), 1);
        assert!(out.reasons[0].starts_with("Insufficient data for ATR"));
    }
}
