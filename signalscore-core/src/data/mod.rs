//! Bar loading.

pub mod reader;

pub use reader::{read_bars_csv, read_bars_path};
