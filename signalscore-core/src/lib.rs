//! SignalScore Core — indicator pipeline, rule-based signal scoring, currency conversion.
//!
//! This crate contains the analysis engine:
//! - Domain types (bars, per-bar indicator snapshots, score results)
//! - Indicator implementations with NaN warmup and a look-ahead guard
//! - `IndicatorPipeline`: bar series in, one snapshot per bar out
//! - `SignalScorer`: ordered fold of scoring rules over the latest snapshot
//! - Currency conversion for local-currency presentation
//! - Verdicts, the one-call `analyze`, CSV bar loading and TOML config
//!
//! Everything here is pure and synchronous apart from the CSV and config
//! readers. Identical input always yields identical output.

pub mod analysis;
pub mod config;
pub mod currency;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod scoring;
pub mod verdict;

pub use analysis::{analyze, Analysis, Analyzer};
pub use config::{AppConfig, AssetClass, AssetSpec, ConfigError};
pub use currency::{to_local, ConversionContext, CurrencyError};
pub use domain::{Bar, BarError, ConfidenceLevel, IndicatorSnapshot, Reading, ScoreResult};
pub use pipeline::{IndicatorPipeline, PipelineError};
pub use scoring::{ScoreState, ScoringRule, SignalScorer};
pub use verdict::{PriceSummary, RiskLevel, SignalLabel, TrendStrength};
