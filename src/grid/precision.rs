//! Price and size rounding to Hyperliquid precision rules
//!
//! According to Hyperliquid docs:
//! - Sizes are rounded to `szDecimals` of the asset
//! - Prices can have up to 5 significant figures
//! - Prices can have at most `MAX_DECIMALS - szDecimals` decimal places (6 for perps)
//! - Integer prices are always allowed
//!
//! All rounding here truncates toward zero on the decimal representation of the
//! value. An order must never end up larger, or priced more aggressively, than
//! what the strategy computed.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::*;

use super::errors::{GridError, GridResult};

/// Maximum price decimals for perps
pub const MAX_DECIMALS_PERP: u32 = 6;

/// Size decimals used for assets missing from the meta
pub const DEFAULT_SIZE_DECIMALS: u32 = 6;

/// Significant figures allowed in a price
pub const PRICE_SIGNIFICANT_FIGURES: u32 = 5;

/// Above this, prices trade in whole units
pub const INTEGER_PRICE_THRESHOLD: f64 = 100_000.0;

/// Size-decimal precision per asset, fetched once from the perp meta
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    sz_decimals: HashMap<String, u32>,
}

impl AssetMetadata {
    pub fn new(sz_decimals: HashMap<String, u32>) -> Self {
        Self { sz_decimals }
    }

    /// Builder: register one asset
    pub fn with_asset(mut self, asset: impl Into<String>, sz_decimals: u32) -> Self {
        self.sz_decimals.insert(asset.into(), sz_decimals);
        self
    }

    pub fn sz_decimals(&self, asset: &str) -> Option<u32> {
        self.sz_decimals.get(asset).copied()
    }

    pub fn contains(&self, asset: &str) -> bool {
        self.sz_decimals.contains_key(asset)
    }

    pub fn len(&self) -> usize {
        self.sz_decimals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sz_decimals.is_empty()
    }

    /// Max decimal places for a price of `asset` (6 when unknown or absent)
    pub fn price_decimals(&self, asset: Option<&str>) -> u32 {
        let sz_decimals = asset.and_then(|a| self.sz_decimals(a)).unwrap_or(0);
        MAX_DECIMALS_PERP.saturating_sub(sz_decimals)
    }

    /// Truncate a size to the asset's size decimals (6 for unknown assets)
    pub fn round_size(&self, size: f64, asset: &str) -> GridResult<f64> {
        let decimals = self.sz_decimals(asset).unwrap_or(DEFAULT_SIZE_DECIMALS);
        let value = to_decimal(size, "size")?;
        from_decimal(truncate(value, decimals), "size")
    }

    /// Truncate a price to exchange tick rules
    ///
    /// Prices above 100k become integers. Otherwise the value is first cut to
    /// 5 significant figures and then to `6 - szDecimals` decimal places.
    pub fn round_price(&self, price: f64, asset: Option<&str>) -> GridResult<f64> {
        let value = to_decimal(price, "price")?;

        if price > INTEGER_PRICE_THRESHOLD {
            return from_decimal(truncate(value, 0), "price");
        }

        let significant = truncate_significant(value, PRICE_SIGNIFICANT_FIGURES);
        let rounded = truncate(significant, self.price_decimals(asset));
        from_decimal(rounded, "price")
    }
}

/// Parse the shortest round-trip decimal form of `value`
fn to_decimal(value: f64, context: &'static str) -> GridResult<Decimal> {
    if !value.is_finite() {
        return Err(GridError::InvalidNumber { context, value });
    }
    Decimal::from_str(&value.to_string()).map_err(|_| GridError::InvalidNumber { context, value })
}

/// Back to the nearest `f64` through the decimal string, so `0.0123` stays `0.0123`
fn from_decimal(value: Decimal, context: &'static str) -> GridResult<f64> {
    value
        .to_string()
        .parse::<f64>()
        .map_err(|_| GridError::InvalidNumber {
            context,
            value: value.to_f64().unwrap_or(f64::NAN),
        })
}

fn truncate(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
}

/// Truncate to `figures` significant digits
///
/// Integer digits are never dropped; a value with more integer digits than
/// `figures` just loses its fraction.
fn truncate_significant(value: Decimal, figures: u32) -> Decimal {
    if value.is_zero() {
        return value;
    }

    let abs = value.abs();
    let decimals = if abs >= Decimal::ONE {
        let mut integer_digits = 0u32;
        let mut rest = abs.trunc();
        while rest >= Decimal::ONE {
            rest = (rest / Decimal::TEN).trunc();
            integer_digits += 1;
        }
        figures.saturating_sub(integer_digits)
    } else {
        // Position of the first non-zero fractional digit
        let mut leading = 0u32;
        let mut scaled = abs;
        while scaled < Decimal::ONE {
            scaled *= Decimal::TEN;
            leading += 1;
        }
        leading - 1 + figures
    };

    truncate(value, decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> AssetMetadata {
        AssetMetadata::default()
            .with_asset("BTC", 5)
            .with_asset("ETH", 4)
            .with_asset("SOL", 2)
            .with_asset("DOGE", 0)
    }

    #[test]
    fn test_price_decimals() {
        let meta = metadata();
        assert_eq!(meta.price_decimals(Some("BTC")), 1);
        assert_eq!(meta.price_decimals(Some("ETH")), 2);
        assert_eq!(meta.price_decimals(Some("UNKNOWN")), 6);
        assert_eq!(meta.price_decimals(None), 6);

        let wide = AssetMetadata::default().with_asset("WIDE", 8);
        assert_eq!(wide.price_decimals(Some("WIDE")), 0);
    }

    #[test]
    fn test_round_size_truncates() {
        let meta = metadata();
        assert_eq!(meta.round_size(0.123456789, "BTC").unwrap(), 0.12345);
        assert_eq!(meta.round_size(1.99999, "DOGE").unwrap(), 1.0);
        assert_eq!(meta.round_size(0.0029, "SOL").unwrap(), 0.0);
        // Unknown assets fall back to 6 decimals
        assert_eq!(meta.round_size(0.123456789, "UNKNOWN").unwrap(), 0.123456);
    }

    #[test]
    fn test_round_price_large_prices_become_integers() {
        let meta = metadata();
        assert_eq!(meta.round_price(123456.78, None).unwrap(), 123456.0);
        assert_eq!(meta.round_price(100000.9, Some("BTC")).unwrap(), 100000.0);
    }

    #[test]
    fn test_round_price_significant_figures() {
        let meta = metadata();
        assert_eq!(meta.round_price(43251.789, Some("BTC")).unwrap(), 43251.0);
        assert_eq!(meta.round_price(99999.99, Some("DOGE")).unwrap(), 99999.0);
        assert_eq!(meta.round_price(1.234567, None).unwrap(), 1.2345);
        assert_eq!(meta.round_price(0.123456789, Some("DOGE")).unwrap(), 0.12345);
        assert_eq!(meta.round_price(0.000123456789, None).unwrap(), 0.000123);
    }

    #[test]
    fn test_round_price_decimal_limit() {
        let meta = metadata();
        // 5 sig figs would keep 2345.6, ETH allows 2 decimals
        assert_eq!(meta.round_price(2345.6789, Some("ETH")).unwrap(), 2345.6);
        // 5 sig figs gives 0.012345, SOL allows only 4 decimals
        assert_eq!(meta.round_price(0.0123456, Some("SOL")).unwrap(), 0.0123);
    }

    #[test]
    fn test_round_price_never_rounds_up() {
        let meta = metadata();
        // Nearest rounding would give 1234.6
        assert_eq!(meta.round_price(1234.56, Some("DOGE")).unwrap(), 1234.5);
        assert_eq!(meta.round_price(17.320508, None).unwrap(), 17.32);
    }

    #[test]
    fn test_integer_prices_pass_through() {
        let meta = metadata();
        assert_eq!(meta.round_price(50000.0, Some("BTC")).unwrap(), 50000.0);
        assert_eq!(meta.round_price(15.0, None).unwrap(), 15.0);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let meta = metadata();
        assert!(matches!(
            meta.round_price(f64::NAN, None),
            Err(GridError::InvalidNumber { context: "price", .. })
        ));
        assert!(matches!(
            meta.round_size(f64::INFINITY, "BTC"),
            Err(GridError::InvalidNumber { context: "size", .. })
        ));
    }

    #[test]
    fn test_truncate_significant_negative_values() {
        let value = Decimal::from_str("-1234.5678").unwrap();
        assert_eq!(
            truncate_significant(value, 5),
            Decimal::from_str("-1234.5").unwrap()
        );
    }
}
