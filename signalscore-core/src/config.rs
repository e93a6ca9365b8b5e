//! Application configuration — fx defaults and the asset catalog.
//!
//! Stored as TOML. Every field has a default, so an empty file (or no file)
//! gives the built-in five-asset catalog priced in IDR.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::currency::{ConversionContext, CurrencyError};

pub const DEFAULT_FX_RATE: f64 = 16_000.0;
pub const DEFAULT_CURRENCY: &str = "IDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid fx rate: {0}")]
    FxRate(#[from] CurrencyError),

    #[error("currency code must not be empty")]
    EmptyCurrency,

    #[error("duplicate ticker in asset catalog: {0}")]
    DuplicateTicker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Commodity,
    Crypto,
    Etf,
    Stock,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Commodity => "commodity",
            AssetClass::Crypto => "crypto",
            AssetClass::Etf => "etf",
            AssetClass::Stock => "stock",
        };
        f.write_str(s)
    }
}

/// One tradable asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub name: String,
    pub ticker: String,
    pub class: AssetClass,
    /// Quoted per troy ounce, displayed locally per gram.
    #[serde(default)]
    pub physical_commodity_unit: bool,
}

impl AssetSpec {
    pub fn new(name: &str, ticker: &str, class: AssetClass, physical_commodity_unit: bool) -> Self {
        Self {
            name: name.to_string(),
            ticker: ticker.to_string(),
            class,
            physical_commodity_unit,
        }
    }
}

fn default_fx_rate() -> f64 {
    DEFAULT_FX_RATE
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_assets() -> Vec<AssetSpec> {
    vec![
        AssetSpec::new("Gold spot", "GC=F", AssetClass::Commodity, true),
        AssetSpec::new("PAX Gold", "PAXG-USD", AssetClass::Crypto, false),
        AssetSpec::new("S&P 500 ETF", "SPY", AssetClass::Etf, false),
        AssetSpec::new("NVIDIA", "NVDA", AssetClass::Stock, false),
        AssetSpec::new("Bitcoin", "BTC-USD", AssetClass::Crypto, false),
    ]
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base-to-local fx rate used when the caller gives none.
    #[serde(default = "default_fx_rate")]
    pub fx_rate: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_assets")]
    pub assets: Vec<AssetSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fx_rate: DEFAULT_FX_RATE,
            currency: default_currency(),
            assets: default_assets(),
        }
    }
}

impl AppConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConversionContext::new(self.fx_rate, false)?;
        if self.currency.trim().is_empty() {
            return Err(ConfigError::EmptyCurrency);
        }
        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(asset.ticker.to_ascii_uppercase()) {
                return Err(ConfigError::DuplicateTicker(asset.ticker.clone()));
            }
        }
        Ok(())
    }

    /// Case-insensitive ticker lookup.
    pub fn find_asset(&self, ticker: &str) -> Option<&AssetSpec> {
        self.assets
            .iter()
            .find(|a| a.ticker.eq_ignore_ascii_case(ticker))
    }

    /// Conversion settings for an asset, with an optional fx override.
    pub fn conversion_for(
        &self,
        asset: Option<&AssetSpec>,
        fx_override: Option<f64>,
    ) -> Result<ConversionContext, ConfigError> {
        let physical = asset.is_some_and(|a| a.physical_commodity_unit);
        let ctx = ConversionContext::new(fx_override.unwrap_or(self.fx_rate), physical)?;
        Ok(ctx.with_currency(self.currency.clone()))
    }
}
