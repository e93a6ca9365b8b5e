//! Base-currency to local-currency conversion.
//!
//! Prices arrive in the provider's base currency (USD). Physical commodities
//! are quoted per troy ounce and displayed locally per gram.

use serde::Serialize;
use thiserror::Error;

/// Grams per troy ounce.
pub const TROY_OUNCE_GRAMS: f64 = 31.1035;

#[derive(Debug, Error, PartialEq)]
pub enum CurrencyError {
    #[error("fx rate must be positive and finite, got {0}")]
    InvalidFxRate(f64),
}

/// Convert a base-currency value to local currency.
///
/// With `physical_commodity_unit` the value is first turned from per-ounce to
/// per-gram. Total for any finite input.
pub fn to_local(value: f64, physical_commodity_unit: bool, fx_rate: f64) -> f64 {
    if physical_commodity_unit {
        (value / TROY_OUNCE_GRAMS) * fx_rate
    } else {
        value * fx_rate
    }
}

/// Per-call conversion settings supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionContext {
    fx_rate: f64,
    physical_commodity_unit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl ConversionContext {
    pub fn new(fx_rate: f64, physical_commodity_unit: bool) -> Result<Self, CurrencyError> {
        if !fx_rate.is_finite() || fx_rate <= 0.0 {
            return Err(CurrencyError::InvalidFxRate(fx_rate));
        }
        Ok(Self {
            fx_rate,
            physical_commodity_unit,
            currency: None,
        })
    }

    /// Attach a display code such as "IDR".
    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    /// Switch between per-gram and per-unit local pricing.
    pub fn with_physical_commodity_unit(mut self, physical: bool) -> Self {
        self.physical_commodity_unit = physical;
        self
    }

    pub fn fx_rate(&self) -> f64 {
        self.fx_rate
    }

    pub fn is_physical_commodity_unit(&self) -> bool {
        self.physical_commodity_unit
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn to_local(&self, value: f64) -> f64 {
        to_local(value, self.physical_commodity_unit, self.fx_rate)
    }

    /// "/gram" for commodity pricing, "/unit" otherwise.
    pub fn unit_label(&self) -> &'static str {
        if self.physical_commodity_unit {
            "/gram"
        } else {
            "/unit"
        }
    }

    /// Render a local amount with the currency code and thousands separators.
    pub fn format_local(&self, value: f64) -> String {
        let amount = group_thousands(value);
        match &self.currency {
            Some(code) => format!("{code} {amount}"),
            None => amount,
        }
    }
}

/// Base amount as `$1,234.50`, followed by the local equivalent when converting.
pub fn format_money(value: f64, conversion: Option<&ConversionContext>) -> String {
    let base = format!("${}", group_thousands(value));
    match conversion {
        Some(ctx) => format!(
            "{base} (≈ {}{})",
            ctx.format_local(ctx.to_local(value)),
            ctx.unit_label()
        ),
        None => base,
    }
}

/// Two-decimal rendering with comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_conversion_multiplies() {
        assert_eq!(to_local(10.0, false, 16_000.0), 160_000.0);
    }

    #[test]
    fn commodity_conversion_is_per_gram() {
        let x = 2_000.0;
        assert_eq!(to_local(x, true, 16_000.0), (x / 31.1035) * 16_000.0);
    }

    #[test]
    fn context_rejects_bad_rates() {
        assert_eq!(
            ConversionContext::new(0.0, false).unwrap_err(),
            CurrencyError::InvalidFxRate(0.0)
        );
        assert!(ConversionContext::new(-1.0, false).is_err());
        assert!(ConversionContext::new(f64::NAN, false).is_err());
        assert!(ConversionContext::new(f64::INFINITY, true).is_err());
    }

    #[test]
    fn context_delegates_to_to_local() {
        let ctx = ConversionContext::new(15_500.0, true).unwrap();
        assert_eq!(ctx.to_local(100.0), to_local(100.0, true, 15_500.0));
        assert_eq!(ctx.unit_label(), "/gram");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(999.5), "999.50");
        assert_eq!(group_thousands(1_234.567), "1,234.57");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567.00");
        assert_eq!(group_thousands(-12_345.0), "-12,345.00");
        assert_eq!(group_thousands(-0.001), "0.00");
    }

    #[test]
    fn money_with_and_without_conversion() {
        assert_eq!(format_money(1_234.5, None), "$1,234.50");
        let ctx = ConversionContext::new(10.0, false).unwrap().with_currency("IDR");
        assert_eq!(format_money(1_234.5, Some(&ctx)), "$1,234.50 (≈ IDR 12,345.00/unit)");
        let gram = ctx.with_physical_commodity_unit(true);
        assert!(format_money(31.1035, Some(&gram)).ends_with("(≈ IDR 10.00/gram)"));
    }

    #[test]
    fn format_local_with_code() {
        let ctx = ConversionContext::new(16_000.0, false)
            .unwrap()
            .with_currency("IDR");
        assert_eq!(ctx.format_local(1_600_000.0), "IDR 1,600,000.00");
    }
}
