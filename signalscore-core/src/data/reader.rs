//! CSV bar reader.
//!
//! Accepts `date,open,high,low,close[,volume]` with a header row. Header
//! names are matched case-insensitively. `Adj Close` stands in for the close
//! when the `Close` column is absent or empty; other extra columns are
//! ignored. Empty price cells become missing values, present values must be
//! positive, and a fully populated row must have a consistent OHLC range.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{check_ascending, Bar, BarError};

#[derive(Debug, Deserialize)]
struct RawRow {
    date: NaiveDate,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default, rename = "adj close")]
    adj_close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

fn price(row: usize, field: &'static str, cell: Option<f64>) -> Result<f64, BarError> {
    match cell {
        None => Ok(f64::NAN),
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(value) => Err(BarError::NonPositive { row, field, value }),
    }
}

impl RawRow {
    fn into_bar(self, row: usize) -> Result<Bar, BarError> {
        let close = match self.close {
            Some(v) => price(row, "close", Some(v))?,
            None => price(row, "adj close", self.adj_close)?,
        };
        let bar = Bar {
            date: self.date,
            open: price(row, "open", self.open)?,
            high: price(row, "high", self.high)?,
            low: price(row, "low", self.low)?,
            close,
            volume: self
                .volume
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round() as u64),
        };
        let complete = [bar.open, bar.high, bar.low, bar.close]
            .iter()
            .all(|v| v.is_finite());
        if complete && !bar.is_sane() {
            return Err(BarError::Inconsistent { row });
        }
        Ok(bar)
    }
}

/// Read an ascending bar series from CSV.
pub fn read_bars_csv<R: Read>(reader: R) -> Result<Vec<Bar>, BarError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: csv::StringRecord = rdr.headers()?.iter().map(str::to_lowercase).collect();
    rdr.set_headers(headers);

    let mut bars = Vec::new();
    for (i, record) in rdr.deserialize::<RawRow>().enumerate() {
        bars.push(record?.into_bar(i)?);
    }
    check_ascending(&bars)?;
    debug!(bars = bars.len(), "read bar series");
    Ok(bars)
}

/// Read an ascending bar series from a CSV file.
pub fn read_bars_path(path: &Path) -> Result<Vec<Bar>, BarError> {
    read_bars_csv(File::open(path)?)
}
