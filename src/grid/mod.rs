//! Hourly grid trading on Hyperliquid perps
//!
//! Every cycle the bot cancels its resting orders for one asset, lays a fresh
//! ladder of limit orders around the current mid and puts a reduce-only
//! take-profit on whatever position has built up.
//!
//! # Architecture
//!
//! - [`precision`] - Size and price truncation to exchange precision
//! - [`types`] - Core data types (OrderSide, GridOrder, Position, etc.)
//! - [`errors`] - Grid-specific error types
//! - [`config`] - Strategy parameters and validation
//! - [`strategy`] - Ladder price and size calculation (progressive or flat)
//! - [`executor`] - Exchange abstraction (mockable for testing)
//! - [`clock`] - Sleep abstraction for pacing and the cycle interval
//! - [`market_data`] - Mids, metadata and positions
//! - [`orders`] - Leverage, cancels, ladder and take-profit submission
//! - [`runner`] - Main execution loop
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use hyperliquid_grid_bot::grid::{
//!     GridParameters, GridRunner, MarketData, OrderSide, RunnerConfig, TokioSleeper,
//! };
//!
//! let params = GridParameters::new("BTC", OrderSide::Buy, 0.002, 4, 0.5)
//!     .with_multipliers(1.5, 0.8)
//!     .with_leverage(20);
//!
//! let metadata = MarketData::new(exchange.clone()).load_asset_metadata().await?;
//! let mut runner = GridRunner::new(
//!     exchange,
//!     Arc::new(TokioSleeper),
//!     metadata,
//!     params,
//!     RunnerConfig::default(),
//! )?;
//!
//! runner.run(CancellationToken::new()).await?;
//! ```
//!
//! # Testing
//!
//! ```rust,ignore
//! use hyperliquid_grid_bot::grid::clock::mock::RecordingSleeper;
//! use hyperliquid_grid_bot::grid::executor::mock::MockExchange;
//!
//! let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
//! let sleeper = Arc::new(RecordingSleeper::new());
//! ```

pub mod clock;
pub mod config;
pub mod errors;
pub mod executor;
pub mod market_data;
pub mod orders;
pub mod precision;
pub mod runner;
pub mod strategy;
pub mod types;

// Re-export commonly used types
pub use clock::{Sleeper, TokioSleeper};
pub use self::config::{GridParameters, SpacingMode};
pub use errors::{GridError, GridResult};
pub use executor::{GridExchange, HyperliquidExchange};
pub use market_data::MarketData;
pub use orders::{OrderExecutor, TakeProfitOutcome};
pub use precision::AssetMetadata;
pub use runner::{CycleReport, GridRunner, RunnerConfig, RunnerState};
pub use strategy::GridStrategy;
pub use types::{
    GridOrder, LimitOrderRequest, OpenOrder, OrderResult, OrderResultStatus, OrderSide,
    PlacementSummary, Position,
};
