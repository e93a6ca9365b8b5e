//! Domain types for signalscore

pub mod bar;
pub mod ids;
pub mod score;
pub mod snapshot;

pub use bar::{check_ascending, Bar, BarError};
pub use ids::DatasetHash;
pub use score::{ConfidenceLevel, LocalFigures, ScoreResult, DATA_UNAVAILABLE};
pub use snapshot::{IndicatorSnapshot, Reading};
