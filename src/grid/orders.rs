//! Write-side wrapper over the exchange: leverage, cancels, ladder and take-profit

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::clock::Sleeper;
use super::config::GridParameters;
use super::errors::{GridError, GridResult};
use super::executor::GridExchange;
use super::market_data::MarketData;
use super::precision::AssetMetadata;
use super::strategy::GridStrategy;
use super::types::{LimitOrderRequest, OrderResult, PlacementSummary};

/// Pause after every write call to stay under exchange rate limits
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// What happened to the take-profit step
#[derive(Debug, Clone, PartialEq)]
pub enum TakeProfitOutcome {
    /// Nothing to protect
    NoPosition,
    /// Order accepted by the exchange
    Placed {
        price: f64,
        size: f64,
        result: OrderResult,
    },
    /// Position has no entry price to mark up from
    MissingEntryPrice,
    /// Position size truncates to zero at the asset's size decimals
    DustPosition,
    /// Exchange refused the order
    Rejected(String),
}

impl TakeProfitOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, TakeProfitOutcome::Placed { .. })
    }
}

pub struct OrderExecutor<E: GridExchange, S: Sleeper> {
    exchange: Arc<E>,
    market: MarketData<E>,
    sleeper: Arc<S>,
    metadata: AssetMetadata,
    pacing: Duration,
}

impl<E: GridExchange, S: Sleeper> OrderExecutor<E, S> {
    pub fn new(exchange: Arc<E>, sleeper: Arc<S>, metadata: AssetMetadata) -> Self {
        Self {
            market: MarketData::new(exchange.clone()),
            exchange,
            sleeper,
            metadata,
            pacing: DEFAULT_PACING,
        }
    }

    /// Builder: set the pause after each write call
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    async fn pace(&self) {
        if !self.pacing.is_zero() {
            self.sleeper.sleep(self.pacing).await;
        }
    }

    /// Set leverage; a rejection is logged and not retried
    pub async fn set_leverage(&self, asset: &str, leverage: u32, is_cross: bool) -> GridResult<()> {
        info!(
            "Setting leverage for {} to {}x ({})",
            asset,
            leverage,
            if is_cross { "cross" } else { "isolated" }
        );
        let result = self.exchange.update_leverage(asset, leverage, is_cross).await;
        self.pace().await;

        match result {
            Ok(()) => {
                info!("Successfully set leverage to {}x for {}", leverage, asset);
                Ok(())
            }
            Err(GridError::Rejected(reason)) => {
                error!("Failed to set leverage for {}: {}", asset, reason);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Cancel every resting order for `asset`, one by one
    ///
    /// A transient failure is logged and skipped. Returns how many succeeded.
    pub async fn cancel_all_orders(&self, asset: &str) -> GridResult<u32> {
        let open_orders = self.exchange.open_orders().await?;
        let mut cancelled = 0u32;

        for order in open_orders.iter().filter(|o| o.asset == asset) {
            debug!(
                "Cancelling {} {} @ {} (oid {})",
                order.side, order.size, order.price, order.oid
            );
            let result = self.exchange.cancel_order(asset, order.oid).await;
            self.pace().await;

            match result {
                Ok(()) => cancelled += 1,
                Err(e) if e.is_transient() => {
                    error!("Error cancelling order {}: {}", order.oid, e)
                }
                Err(e) => return Err(e),
            }
        }

        info!("Cancelled {} orders for {}", cancelled, asset);
        Ok(cancelled)
    }

    /// Compute the ladder around the current mid and submit every rung
    ///
    /// A rejected or failed rung is logged and the remaining rungs still go out.
    pub async fn place_grid_orders(&self, params: &GridParameters) -> GridResult<PlacementSummary> {
        let current_price = self.market.get_current_price(&params.asset).await?;
        let ladder = GridStrategy::build_ladder(&self.metadata, params, current_price)?;

        debug!(
            "Ladder for {} around {}: {:?}",
            params.asset, current_price, ladder
        );

        let mut summary = PlacementSummary::default();
        for rung in &ladder {
            let request = LimitOrderRequest::new(&params.asset, params.side, rung.price, rung.size);
            summary.attempted += 1;

            let result = self.exchange.place_limit_order(&request).await;
            self.pace().await;

            match result {
                Ok(result) => {
                    summary.placed += 1;
                    info!(
                        "Success: {} order at {} with size {} (oid {})",
                        params.side, rung.price, rung.size, result.oid
                    );
                }
                Err(e) if e.is_transient() => error!(
                    "Order failed: {} {} @ {}: {}",
                    params.side, rung.size, rung.price, e
                ),
                Err(e) => return Err(e),
            }
        }

        info!("Placed {}/{} orders", summary.placed, params.num_orders);
        Ok(summary)
    }

    /// Reduce-only exit for the open position at `markup_percentage` past entry
    ///
    /// Longs are sold above entry, shorts bought back below it.
    pub async fn place_take_profit_order(
        &self,
        asset: &str,
        markup_percentage: f64,
    ) -> GridResult<TakeProfitOutcome> {
        let Some(position) = self.market.get_position_info(asset).await? else {
            warn!("No open position found for {}, skipping take profit", asset);
            return Ok(TakeProfitOutcome::NoPosition);
        };

        let Some(entry_price) = position.entry_price else {
            warn!("Position for {} has no entry price, skipping take profit", asset);
            return Ok(TakeProfitOutcome::MissingEntryPrice);
        };

        let size = self.metadata.round_size(position.size.abs(), asset)?;
        if size == 0.0 {
            warn!(
                "Position size {} for {} truncates to zero, skipping take profit",
                position.size, asset
            );
            return Ok(TakeProfitOutcome::DustPosition);
        }

        let side = position.closing_side();
        let markup = markup_percentage / 100.0;
        let raw_price = if position.is_long() {
            entry_price * (1.0 + markup)
        } else {
            entry_price * (1.0 - markup)
        };
        let price = self.metadata.round_price(raw_price, Some(asset))?;

        info!(
            "Placing take profit order: {} {} {} at {} (reduce only)",
            side, size, asset, price
        );
        let request = LimitOrderRequest::new(asset, side, price, size).reduce_only(true);
        let result = self.exchange.place_limit_order(&request).await;
        self.pace().await;

        match result {
            Ok(result) => {
                info!("Successfully placed take profit order at {}", price);
                Ok(TakeProfitOutcome::Placed {
                    price,
                    size,
                    result,
                })
            }
            Err(GridError::Rejected(reason)) => {
                error!("Take profit order failed: {}", reason);
                Ok(TakeProfitOutcome::Rejected(reason))
            }
            Err(e) => Err(e),
        }
    }
}
