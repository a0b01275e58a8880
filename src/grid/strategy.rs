//! Grid strategy - ladder price and size calculation

use log::warn;

use super::config::{GridParameters, SpacingMode};
use super::errors::GridResult;
use super::precision::AssetMetadata;
use super::types::{GridOrder, OrderSide};

/// Grid strategy - turns parameters and a mid price into a ladder
#[derive(Debug, Clone, Copy, Default)]
pub struct GridStrategy {
    pub spacing_mode: SpacingMode,
}

impl GridStrategy {
    /// Spacing and sizes grow geometrically per rung
    pub fn progressive() -> Self {
        Self {
            spacing_mode: SpacingMode::Progressive,
        }
    }

    /// Evenly spaced rungs of equal size
    pub fn flat() -> Self {
        Self {
            spacing_mode: SpacingMode::Flat,
        }
    }

    pub fn new(spacing_mode: SpacingMode) -> Self {
        Self { spacing_mode }
    }

    /// Calculate rung prices around `current_price`
    ///
    /// Buy ladders come back ascending, sell ladders descending.
    /// `spacing_multiplier` only applies in progressive mode.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_grid_prices(
        &self,
        metadata: &AssetMetadata,
        current_price: f64,
        num_orders: u32,
        spacing_percentage: f64,
        side: OrderSide,
        asset: &str,
        spacing_multiplier: f64,
    ) -> GridResult<Vec<f64>> {
        let base_spacing = spacing_percentage / 100.0;
        let mut cumulative_spacing = 0.0;
        let mut prices = Vec::with_capacity(num_orders as usize);

        for i in 0..num_orders {
            cumulative_spacing = match self.spacing_mode {
                SpacingMode::Progressive => {
                    cumulative_spacing + base_spacing * spacing_multiplier.powi(i as i32)
                }
                SpacingMode::Flat => base_spacing * (i + 1) as f64,
            };

            let multiplier = match side {
                OrderSide::Buy => 1.0 - cumulative_spacing,
                OrderSide::Sell => 1.0 + cumulative_spacing,
            };
            prices.push(metadata.round_price(current_price * multiplier, Some(asset))?);
        }

        match side {
            OrderSide::Buy => prices.sort_by(|a, b| a.total_cmp(b)),
            OrderSide::Sell => prices.sort_by(|a, b| b.total_cmp(a)),
        }
        Ok(prices)
    }

    /// Rung `i` gets `base_size * size_multiplier^i`, truncated to size decimals
    pub fn calculate_progressive_sizes(
        &self,
        metadata: &AssetMetadata,
        base_size: f64,
        num_orders: u32,
        size_multiplier: f64,
        asset: &str,
    ) -> GridResult<Vec<f64>> {
        (0..num_orders)
            .map(|i| metadata.round_size(base_size * size_multiplier.powi(i as i32), asset))
            .collect()
    }

    /// Build the full ladder for `params` around `current_price`
    ///
    /// The spacing mode comes from `params`.
    pub fn build_ladder(
        metadata: &AssetMetadata,
        params: &GridParameters,
        current_price: f64,
    ) -> GridResult<Vec<GridOrder>> {
        let strategy = Self::new(params.spacing_mode);
        let (spacing_multiplier, size_multiplier) = match params.spacing_mode {
            SpacingMode::Progressive => (params.spacing_multiplier, params.size_multiplier),
            SpacingMode::Flat => {
                if params.spacing_multiplier != 1.0 || params.size_multiplier != 1.0 {
                    warn!(
                        "Flat spacing ignores multipliers (spacing={}, size={})",
                        params.spacing_multiplier, params.size_multiplier
                    );
                }
                (1.0, 1.0)
            }
        };

        let prices = strategy.calculate_grid_prices(
            metadata,
            current_price,
            params.num_orders,
            params.spacing_percentage,
            params.side,
            &params.asset,
            spacing_multiplier,
        )?;
        let sizes = strategy.calculate_progressive_sizes(
            metadata,
            params.position_size,
            params.num_orders,
            size_multiplier,
            &params.asset,
        )?;

        Ok(prices
            .into_iter()
            .zip(sizes)
            .map(|(price, size)| GridOrder::new(price, size))
            .collect())
    }
}
