//! Core data types for grid trading

use serde::{Deserialize, Serialize};

/// Side of the grid ladder and of individual orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn is_buy(&self) -> bool {
        matches!(self, OrderSide::Buy)
    }
}

impl From<&str> for OrderSide {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "B" | "BUY" => OrderSide::Buy,
            _ => OrderSide::Sell,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// One rung of the ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOrder {
    pub price: f64,
    pub size: f64,
}

impl GridOrder {
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }
}

/// Request to place a good-till-cancelled limit order
#[derive(Debug, Clone, PartialEq)]
pub struct LimitOrderRequest {
    /// Asset/coin (e.g., "BTC")
    pub asset: String,
    /// Order side
    pub side: OrderSide,
    /// Limit price, already rounded to exchange precision
    pub price: f64,
    /// Order size, already rounded to exchange precision
    pub size: f64,
    /// Whether the order may only shrink an existing position
    pub reduce_only: bool,
}

impl LimitOrderRequest {
    /// Create a new GTC limit order request
    pub fn new(asset: impl Into<String>, side: OrderSide, price: f64, size: f64) -> Self {
        Self {
            asset: asset.into(),
            side,
            price,
            size,
            reduce_only: false,
        }
    }

    /// Set reduce_only flag
    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }
}

/// Position snapshot for a perp asset, re-read every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Asset/coin
    pub asset: String,
    /// Position size (positive = long, negative = short)
    pub size: f64,
    /// Average entry price, when the exchange reports one
    pub entry_price: Option<f64>,
    /// Current leverage setting
    pub leverage: u32,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.size > 0.0
    }

    /// Side of the order that closes this position
    pub fn closing_side(&self) -> OrderSide {
        if self.is_long() {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }
    }
}

/// Resting order as reported by the exchange
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub asset: String,
    pub oid: u64,
    pub side: OrderSide,
    pub price: f64,
    pub size: f64,
}

/// Order result from exchange
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    /// Exchange order ID
    pub oid: u64,
    /// Result status
    pub status: OrderResultStatus,
}

/// Status of order placement
#[derive(Debug, Clone, PartialEq)]
pub enum OrderResultStatus {
    /// Order is resting on the book
    Resting,
    /// Order was immediately filled
    Filled { avg_price: f64, filled_size: f64 },
    /// Order is waiting for trigger (stop orders)
    WaitingForTrigger,
}

/// Outcome of submitting one ladder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementSummary {
    /// Orders accepted by the exchange
    pub placed: u32,
    /// Orders submitted
    pub attempted: u32,
}

impl PlacementSummary {
    pub fn failed(&self) -> u32 {
        self.attempted - self.placed
    }
}
