//! Property-based tests for the rounding and ladder math.
//!
//! These tests verify invariants hold under random inputs.

use std::str::FromStr;

use hyperliquid_grid_bot::grid::{AssetMetadata, GridParameters, GridStrategy, OrderSide};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_decimal(value: f64) -> Decimal {
    Decimal::from_str(&value.to_string()).unwrap().normalize()
}

fn significant_figures(value: Decimal) -> usize {
    let mantissa = value.normalize().mantissa().abs().to_string();
    mantissa.trim_end_matches('0').len().max(1)
}

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = f64> {
    (1u64..2_000_000_000u64).prop_map(|x| x as f64 / 10_000.0) // 0.0001 to 200,000
}

fn size_strategy() -> impl Strategy<Value = f64> {
    (0u64..10_000_000_000u64).prop_map(|x| x as f64 / 10_000_000.0) // 0 to 1,000
}

fn mid_strategy() -> impl Strategy<Value = f64> {
    (1_000_000u64..2_000_000_000u64).prop_map(|x| x as f64 / 10_000.0) // 100 to 200,000
}

fn side_strategy() -> impl Strategy<Value = OrderSide> {
    prop_oneof![Just(OrderSide::Buy), Just(OrderSide::Sell)]
}

fn metadata(sz_decimals: u32) -> AssetMetadata {
    AssetMetadata::default().with_asset("TEST", sz_decimals)
}

#[test]
fn known_ladder_is_exact() {
    let params = GridParameters::new("TEST", OrderSide::Buy, 0.002, 3, 1.0);
    let ladder = GridStrategy::build_ladder(&metadata(5), &params, 50000.0).unwrap();

    let prices: Vec<Decimal> = ladder.iter().map(|o| as_decimal(o.price)).collect();
    assert_eq!(prices, vec![dec!(48500), dec!(49000), dec!(49500)]);
    assert!(ladder.iter().all(|o| as_decimal(o.size) == dec!(0.002)));
}

proptest! {
    /// Prices above 100k become whole numbers no larger than the input
    #[test]
    fn high_prices_truncate_to_integers(
        price in (100_001u64..10_000_000u64, 0u32..10_000u32)
            .prop_map(|(whole, frac)| whole as f64 + frac as f64 / 10_000.0),
        sz_decimals in 0u32..=5u32,
    ) {
        let rounded = metadata(sz_decimals).round_price(price, Some("TEST")).unwrap();
        prop_assert_eq!(rounded.fract(), 0.0);
        prop_assert!(rounded <= price);
        prop_assert!(price - rounded < 1.0);
    }

    /// Rounded prices respect significant figures and decimal places and never exceed the input
    #[test]
    fn price_rounding_respects_tick_rules(
        price in price_strategy(),
        sz_decimals in 0u32..=5u32,
    ) {
        prop_assume!(price <= 100_000.0);
        let rounded = metadata(sz_decimals).round_price(price, Some("TEST")).unwrap();
        let decimal = as_decimal(rounded);

        prop_assert!(rounded <= price);
        prop_assert!(rounded >= 0.0);
        prop_assert!(decimal.scale() <= 6 - sz_decimals);
        prop_assert!(significant_figures(decimal) <= 5);
    }

    /// Unknown assets get six price decimals
    #[test]
    fn unknown_asset_price_has_six_decimals(price in price_strategy()) {
        prop_assume!(price <= 100_000.0);
        let rounded = metadata(2).round_price(price, Some("OTHER")).unwrap();
        prop_assert!(rounded <= price);
        prop_assert!(as_decimal(rounded).scale() <= 6);
    }

    /// Sizes are truncated to the asset's size decimals, never rounded up
    #[test]
    fn size_rounding_truncates(
        size in size_strategy(),
        sz_decimals in 0u32..=5u32,
    ) {
        let rounded = metadata(sz_decimals).round_size(size, "TEST").unwrap();
        prop_assert!(rounded <= size);
        prop_assert!(rounded >= 0.0);
        prop_assert!(as_decimal(rounded).scale() <= sz_decimals);

        let step = 10f64.powi(-(sz_decimals as i32));
        prop_assert!(size - rounded < step + 1e-9);
    }

    /// Ladder has one rung per order, all on the correct side of the mid, in order
    #[test]
    fn ladder_shape(
        mid in mid_strategy(),
        num_orders in 0u32..10u32,
        spacing in (20u32..=100u32).prop_map(|x| x as f64 / 100.0), // 0.2% to 1%
        spacing_multiplier in (100u32..=130u32).prop_map(|x| x as f64 / 100.0),
        side in side_strategy(),
        sz_decimals in 0u32..=5u32,
    ) {
        let prices = GridStrategy::progressive()
            .calculate_grid_prices(
                &metadata(sz_decimals),
                mid,
                num_orders,
                spacing,
                side,
                "TEST",
                spacing_multiplier,
            )
            .unwrap();

        prop_assert_eq!(prices.len(), num_orders as usize);
        for window in prices.windows(2) {
            match side {
                OrderSide::Buy => prop_assert!(window[0] <= window[1]),
                OrderSide::Sell => prop_assert!(window[0] >= window[1]),
            }
        }
        for price in &prices {
            match side {
                OrderSide::Buy => prop_assert!(*price < mid),
                OrderSide::Sell => prop_assert!(*price > mid),
            }
        }
    }

    /// Flat ladders behave like progressive ones for the shape invariants
    #[test]
    fn flat_ladder_shape(
        mid in mid_strategy(),
        num_orders in 1u32..10u32,
        spacing in (20u32..=100u32).prop_map(|x| x as f64 / 100.0),
        side in side_strategy(),
    ) {
        let prices = GridStrategy::flat()
            .calculate_grid_prices(&metadata(4), mid, num_orders, spacing, side, "TEST", 1.0)
            .unwrap();

        prop_assert_eq!(prices.len(), num_orders as usize);
        match side {
            OrderSide::Buy => prop_assert!(prices.iter().all(|p| *p < mid)),
            OrderSide::Sell => prop_assert!(prices.iter().all(|p| *p > mid)),
        }
    }

    /// Unit size multiplier gives equal rungs; otherwise rung i never exceeds base * m^i
    #[test]
    fn progressive_sizes(
        base in (1u64..1_000_000u64).prop_map(|x| x as f64 / 10_000.0),
        num_orders in 0u32..10u32,
        size_multiplier in (50u32..=200u32).prop_map(|x| x as f64 / 100.0),
        sz_decimals in 0u32..=5u32,
    ) {
        let strategy = GridStrategy::progressive();
        let meta = metadata(sz_decimals);

        let flat = strategy
            .calculate_progressive_sizes(&meta, base, num_orders, 1.0, "TEST")
            .unwrap();
        let expected = meta.round_size(base, "TEST").unwrap();
        prop_assert_eq!(flat.len(), num_orders as usize);
        prop_assert!(flat.iter().all(|s| *s == expected));

        let sizes = strategy
            .calculate_progressive_sizes(&meta, base, num_orders, size_multiplier, "TEST")
            .unwrap();
        for (i, size) in sizes.iter().enumerate() {
            prop_assert!(*size <= base * size_multiplier.powi(i as i32));
            prop_assert!(as_decimal(*size).scale() <= sz_decimals);
        }
    }
}
