//! Read-side wrapper over the exchange: mids, metadata, positions

use std::sync::Arc;

use log::info;

use super::errors::{GridError, GridResult};
use super::executor::GridExchange;
use super::precision::AssetMetadata;
use super::types::Position;

pub struct MarketData<E: GridExchange> {
    exchange: Arc<E>,
}

impl<E: GridExchange> Clone for MarketData<E> {
    fn clone(&self) -> Self {
        Self {
            exchange: self.exchange.clone(),
        }
    }
}

impl<E: GridExchange> MarketData<E> {
    pub fn new(exchange: Arc<E>) -> Self {
        Self { exchange }
    }

    /// Fetch size decimals for the whole perp universe; done once per session
    pub async fn load_asset_metadata(&self) -> GridResult<AssetMetadata> {
        let sz_decimals = self.exchange.perp_size_decimals().await?;
        info!("Loaded size decimals for {} assets", sz_decimals.len());
        Ok(AssetMetadata::new(sz_decimals))
    }

    /// Current mid price for `asset`
    pub async fn get_current_price(&self, asset: &str) -> GridResult<f64> {
        let mids = self.exchange.all_mids().await?;
        mids.get(asset).copied().ok_or_else(|| {
            GridError::AssetNotFound(format!("{} not found in available markets", asset))
        })
    }

    /// Open position for `asset`, if any
    ///
    /// Entries with zero size are reported as no position.
    pub async fn get_position_info(&self, asset: &str) -> GridResult<Option<Position>> {
        let positions = self.exchange.positions().await?;

        match positions
            .into_iter()
            .find(|p| p.asset == asset && p.size != 0.0)
        {
            Some(position) => {
                match position.entry_price {
                    Some(entry) => info!(
                        "Current position for {}: size={}, leverage={}x, entry={}",
                        asset, position.size, position.leverage, entry
                    ),
                    None => info!(
                        "Current position for {}: size={}, leverage={}x, entry unknown",
                        asset, position.size, position.leverage
                    ),
                }
                Ok(Some(position))
            }
            None => {
                info!("No existing position found for {}", asset);
                Ok(None)
            }
        }
    }
}
