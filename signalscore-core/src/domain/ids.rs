use serde::{Deserialize, Serialize};
use std::fmt;

use super::Bar;

/// Deterministic dataset hash (BLAKE3 content hash of a bar series).
///
/// Two analyses with equal hashes were computed from identical input, so
/// their outputs must be identical too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    /// Hash every field of every bar in order.
    ///
    /// Floats are hashed by bit pattern, so a NaN cell and an empty cell hash
    /// the same while `0.0` and `-0.0` differ.
    pub fn of_bars(bars: &[Bar]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(bars.len() as u64).to_le_bytes());
        for bar in bars {
            hasher.update(bar.date.to_string().as_bytes());
            for value in [bar.open, bar.high, bar.low, bar.close] {
                let bits = if value.is_nan() { f64::NAN.to_bits() } else { value.to_bits() };
                hasher.update(&bits.to_le_bytes());
            }
            match bar.volume {
                Some(v) => hasher.update(&[1]).update(&v.to_le_bytes()),
                None => hasher.update(&[0]),
            };
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
