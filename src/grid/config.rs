//! Grid strategy parameters

use serde::{Deserialize, Serialize};

use super::errors::{GridError, GridResult};
use super::types::OrderSide;

/// How rung spacing and sizes grow along the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpacingMode {
    /// Spacing and size grow geometrically by their multipliers per rung
    #[default]
    Progressive,
    /// Rung `i` sits `spacing * (i + 1)` away and every rung has the base size
    Flat,
}

/// Grid bot parameters, fixed for the lifetime of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParameters {
    /// Asset/coin to trade (e.g., "BTC", "ETH")
    pub asset: String,

    /// Ladder side: buys below the mid or sells above it
    pub side: OrderSide,

    /// Size of the first rung in base asset units
    pub position_size: f64,

    /// Number of rungs in the ladder
    pub num_orders: u32,

    /// Distance of the first rung from the mid, in percent
    pub spacing_percentage: f64,

    /// Per-rung growth of the spacing (progressive mode only)
    #[serde(default = "default_multiplier")]
    pub spacing_multiplier: f64,

    /// Per-rung growth of the size (progressive mode only)
    #[serde(default = "default_multiplier")]
    pub size_multiplier: f64,

    /// Spacing mode (progressive or flat)
    #[serde(default)]
    pub spacing_mode: SpacingMode,

    /// Leverage applied at the start of every cycle
    #[serde(default = "default_leverage")]
    pub leverage: u32,

    /// Cross margin when true, isolated otherwise
    #[serde(default = "default_cross_margin")]
    pub cross_margin: bool,

    /// Take-profit distance from the entry price, in percent
    #[serde(default = "default_take_profit_markup")]
    pub take_profit_markup_percentage: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_leverage() -> u32 {
    1
}

fn default_cross_margin() -> bool {
    true
}

fn default_take_profit_markup() -> f64 {
    0.15
}

impl GridParameters {
    /// Create parameters with the required fields; everything else takes defaults
    ///
    /// # Arguments
    /// * `asset` - Asset/coin to trade (e.g., "BTC")
    /// * `side` - Buy ladder below the mid or sell ladder above it
    /// * `position_size` - Size of the first rung
    /// * `num_orders` - Number of rungs
    /// * `spacing_percentage` - Distance of the first rung, in percent
    pub fn new(
        asset: impl Into<String>,
        side: OrderSide,
        position_size: f64,
        num_orders: u32,
        spacing_percentage: f64,
    ) -> Self {
        Self {
            asset: asset.into(),
            side,
            position_size,
            num_orders,
            spacing_percentage,
            spacing_multiplier: default_multiplier(),
            size_multiplier: default_multiplier(),
            spacing_mode: SpacingMode::default(),
            leverage: default_leverage(),
            cross_margin: default_cross_margin(),
            take_profit_markup_percentage: default_take_profit_markup(),
        }
    }

    /// Builder: set spacing mode
    pub fn with_spacing_mode(mut self, mode: SpacingMode) -> Self {
        self.spacing_mode = mode;
        self
    }

    /// Builder: set spacing and size multipliers
    pub fn with_multipliers(mut self, spacing_multiplier: f64, size_multiplier: f64) -> Self {
        self.spacing_multiplier = spacing_multiplier;
        self.size_multiplier = size_multiplier;
        self
    }

    /// Builder: set leverage
    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    /// Builder: use isolated margin instead of cross
    pub fn with_isolated_margin(mut self) -> Self {
        self.cross_margin = false;
        self
    }

    /// Builder: set take-profit markup
    pub fn with_take_profit_markup(mut self, markup_percentage: f64) -> Self {
        self.take_profit_markup_percentage = markup_percentage;
        self
    }

    /// Validate the parameters
    ///
    /// Spacing is deliberately left unchecked: zero or negative spacing yields
    /// a degenerate ladder rather than an error.
    pub fn validate(&self) -> GridResult<()> {
        if self.asset.is_empty() {
            return Err(GridError::InvalidConfig("asset cannot be empty".into()));
        }

        if !self.position_size.is_finite() || self.position_size < 0.0 {
            return Err(GridError::InvalidConfig(
                "position_size must be a non-negative number".into(),
            ));
        }

        if !self.spacing_multiplier.is_finite() || !self.size_multiplier.is_finite() {
            return Err(GridError::InvalidConfig(
                "multipliers must be finite".into(),
            ));
        }

        if self.leverage == 0 || self.leverage > 100 {
            return Err(GridError::InvalidConfig(
                "leverage must be between 1 and 100".into(),
            ));
        }

        Ok(())
    }
}
