//! Exchange abstraction for grid trading - enables mocking for tests

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use hyperliquid_rust_sdk::{
    ClientCancelRequest, ClientLimit, ClientOrder, ClientOrderRequest, ExchangeClient,
    ExchangeDataStatus, ExchangeResponseStatus, InfoClient,
};
use log::debug;
use tokio::sync::Mutex;

use super::errors::{GridError, GridResult};
use super::types::{LimitOrderRequest, OpenOrder, OrderResult, OrderResultStatus, OrderSide, Position};

/// Time in force for every order this bot sends
pub const GOOD_TILL_CANCELLED: &str = "Gtc";

/// Exchange operations trait - can be mocked for testing
#[async_trait]
pub trait GridExchange: Send + Sync {
    /// Mid price of every quoted asset
    async fn all_mids(&self) -> GridResult<HashMap<String, f64>>;

    /// Size decimals of every perp asset in the universe
    async fn perp_size_decimals(&self) -> GridResult<HashMap<String, u32>>;

    /// Open positions of the trading account
    async fn positions(&self) -> GridResult<Vec<Position>>;

    /// Resting orders of the trading account, all assets
    async fn open_orders(&self) -> GridResult<Vec<OpenOrder>>;

    /// Place a GTC limit order
    async fn place_limit_order(&self, order: &LimitOrderRequest) -> GridResult<OrderResult>;

    /// Cancel an order by oid
    async fn cancel_order(&self, asset: &str, oid: u64) -> GridResult<()>;

    /// Update leverage for perp trading
    async fn update_leverage(&self, asset: &str, leverage: u32, is_cross: bool) -> GridResult<()>;
}

// ============================================================================
// Real Hyperliquid Implementation
// ============================================================================

/// Real Hyperliquid exchange implementation
///
/// Reads go to `account_address`, which differs from the signer's address when
/// the signing key is an agent wallet.
pub struct HyperliquidExchange {
    exchange_client: Arc<ExchangeClient>,
    info_client: Arc<Mutex<InfoClient>>,
    account_address: Address,
}

impl HyperliquidExchange {
    pub fn new(
        exchange_client: ExchangeClient,
        info_client: InfoClient,
        account_address: Address,
    ) -> Self {
        Self {
            exchange_client: Arc::new(exchange_client),
            info_client: Arc::new(Mutex::new(info_client)),
            account_address,
        }
    }

    pub fn account_address(&self) -> Address {
        self.account_address
    }

    pub fn signer_address(&self) -> Address {
        self.exchange_client.wallet.address()
    }
}

fn parse_number(field: &'static str, raw: &str) -> GridResult<f64> {
    raw.parse::<f64>()
        .map_err(|_| GridError::Exchange(format!("Unparseable {}: {:?}", field, raw)))
}

/// First status of an `Ok` response, or the rejection it carries
fn first_status(response: ExchangeResponseStatus) -> GridResult<ExchangeDataStatus> {
    match response {
        ExchangeResponseStatus::Ok(resp) => resp
            .data
            .and_then(|data| data.statuses.into_iter().next())
            .ok_or_else(|| GridError::Exchange("No status in response".into())),
        ExchangeResponseStatus::Err(e) => Err(GridError::Rejected(e)),
    }
}

#[async_trait]
impl GridExchange for HyperliquidExchange {
    async fn all_mids(&self) -> GridResult<HashMap<String, f64>> {
        let info = self.info_client.lock().await;
        let mids = info.all_mids().await?;

        Ok(mids
            .into_iter()
            .filter_map(|(coin, raw)| match raw.parse::<f64>() {
                Ok(price) => Some((coin, price)),
                Err(_) => {
                    debug!("Skipping unparseable mid for {}: {}", coin, raw);
                    None
                }
            })
            .collect())
    }

    async fn perp_size_decimals(&self) -> GridResult<HashMap<String, u32>> {
        let info = self.info_client.lock().await;
        let meta = info.meta().await?;

        Ok(meta
            .universe
            .into_iter()
            .map(|asset| (asset.name, asset.sz_decimals))
            .collect())
    }

    async fn positions(&self) -> GridResult<Vec<Position>> {
        let info = self.info_client.lock().await;
        let user_state = info.user_state(self.account_address).await?;

        user_state
            .asset_positions
            .into_iter()
            .map(|p| {
                let position = p.position;
                let entry_price = position
                    .entry_px
                    .as_deref()
                    .map(|raw| parse_number("entryPx", raw))
                    .transpose()?;
                Ok(Position {
                    size: parse_number("szi", &position.szi)?,
                    entry_price,
                    leverage: position.leverage.value,
                    asset: position.coin,
                })
            })
            .collect()
    }

    async fn open_orders(&self) -> GridResult<Vec<OpenOrder>> {
        let info = self.info_client.lock().await;
        let orders = info.open_orders(self.account_address).await?;

        orders
            .into_iter()
            .map(|o| {
                Ok(OpenOrder {
                    side: OrderSide::from(o.side.as_str()),
                    price: parse_number("limitPx", &o.limit_px)?,
                    size: parse_number("sz", &o.sz)?,
                    oid: o.oid,
                    asset: o.coin,
                })
            })
            .collect()
    }

    async fn place_limit_order(&self, order: &LimitOrderRequest) -> GridResult<OrderResult> {
        let client_order = ClientOrderRequest {
            asset: order.asset.clone(),
            is_buy: order.side.is_buy(),
            reduce_only: order.reduce_only,
            limit_px: order.price,
            sz: order.size,
            cloid: None,
            order_type: ClientOrder::Limit(ClientLimit {
                tif: GOOD_TILL_CANCELLED.to_string(),
            }),
        };

        let response = self.exchange_client.order(client_order, None).await?;

        match first_status(response)? {
            ExchangeDataStatus::Resting(r) => Ok(OrderResult {
                oid: r.oid,
                status: OrderResultStatus::Resting,
            }),
            ExchangeDataStatus::Filled(f) => Ok(OrderResult {
                oid: f.oid,
                status: OrderResultStatus::Filled {
                    avg_price: parse_number("avgPx", &f.avg_px)?,
                    filled_size: parse_number("totalSz", &f.total_sz)?,
                },
            }),
            ExchangeDataStatus::WaitingForTrigger => Ok(OrderResult {
                oid: 0,
                status: OrderResultStatus::WaitingForTrigger,
            }),
            ExchangeDataStatus::Error(e) => Err(GridError::Rejected(e)),
            other => Err(GridError::Exchange(format!("Unexpected status: {:?}", other))),
        }
    }

    async fn cancel_order(&self, asset: &str, oid: u64) -> GridResult<()> {
        let cancel_req = ClientCancelRequest {
            asset: asset.to_string(),
            oid,
        };

        let response = self.exchange_client.cancel(cancel_req, None).await?;

        match first_status(response)? {
            ExchangeDataStatus::Success => Ok(()),
            ExchangeDataStatus::Error(e) => Err(GridError::Rejected(e)),
            other => Err(GridError::Exchange(format!("Unexpected status: {:?}", other))),
        }
    }

    async fn update_leverage(&self, asset: &str, leverage: u32, is_cross: bool) -> GridResult<()> {
        let response = self
            .exchange_client
            .update_leverage(leverage, asset, is_cross, None)
            .await?;

        match response {
            ExchangeResponseStatus::Ok(_) => Ok(()),
            ExchangeResponseStatus::Err(e) => Err(GridError::Rejected(e)),
        }
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

/// Mock exchange for testing grid bots without a real exchange connection.
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Mock exchange for testing
    pub struct MockExchange {
        pub mids: Arc<Mutex<HashMap<String, f64>>>,
        pub sz_decimals: Arc<Mutex<HashMap<String, u32>>>,
        pub positions: Arc<Mutex<Vec<Position>>>,
        pub open_orders: Arc<Mutex<Vec<OpenOrder>>>,
        pub placed: Arc<Mutex<Vec<LimitOrderRequest>>>,
        pub cancelled: Arc<Mutex<Vec<(String, u64)>>>,
        pub leverage_updates: Arc<Mutex<Vec<(String, u32, bool)>>>,
        /// Cancels of these oids fail
        pub failing_cancels: Arc<Mutex<HashSet<u64>>>,
        /// Orders at these prices are rejected
        pub rejected_prices: Arc<Mutex<Vec<f64>>>,
        pub reject_leverage: Arc<Mutex<bool>>,
        pub should_fail_reads: Arc<Mutex<bool>>,
        next_oid: AtomicU64,
    }

    impl MockExchange {
        pub fn new() -> Self {
            Self {
                mids: Arc::new(Mutex::new(HashMap::new())),
                sz_decimals: Arc::new(Mutex::new(HashMap::new())),
                positions: Arc::new(Mutex::new(Vec::new())),
                open_orders: Arc::new(Mutex::new(Vec::new())),
                placed: Arc::new(Mutex::new(Vec::new())),
                cancelled: Arc::new(Mutex::new(Vec::new())),
                leverage_updates: Arc::new(Mutex::new(Vec::new())),
                failing_cancels: Arc::new(Mutex::new(HashSet::new())),
                rejected_prices: Arc::new(Mutex::new(Vec::new())),
                reject_leverage: Arc::new(Mutex::new(false)),
                should_fail_reads: Arc::new(Mutex::new(false)),
                next_oid: AtomicU64::new(1),
            }
        }

        /// Mock quoting a single asset
        pub async fn with_asset(asset: &str, mid_price: f64, sz_decimals: u32) -> Self {
            let exchange = Self::new();
            exchange.set_mid_price(asset, mid_price).await;
            exchange.sz_decimals.lock().await.insert(asset.to_string(), sz_decimals);
            exchange
        }

        pub async fn set_mid_price(&self, asset: &str, price: f64) {
            self.mids.lock().await.insert(asset.to_string(), price);
        }

        pub async fn set_position(&self, position: Position) {
            let mut positions = self.positions.lock().await;
            positions.retain(|p| p.asset != position.asset);
            positions.push(position);
        }

        pub async fn add_open_order(&self, asset: &str, oid: u64) {
            self.open_orders.lock().await.push(OpenOrder {
                asset: asset.to_string(),
                oid,
                side: OrderSide::Buy,
                price: 0.0,
                size: 0.0,
            });
        }

        pub async fn fail_cancel(&self, oid: u64) {
            self.failing_cancels.lock().await.insert(oid);
        }

        pub async fn reject_order_at(&self, price: f64) {
            self.rejected_prices.lock().await.push(price);
        }

        pub async fn set_reject_leverage(&self, reject: bool) {
            *self.reject_leverage.lock().await = reject;
        }

        pub async fn set_should_fail_reads(&self, fail: bool) {
            *self.should_fail_reads.lock().await = fail;
        }

        async fn check_reads(&self) -> GridResult<()> {
            if *self.should_fail_reads.lock().await {
                return Err(GridError::Exchange("Mock read failure".into()));
            }
            Ok(())
        }
    }

    impl Default for MockExchange {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl GridExchange for MockExchange {
        async fn all_mids(&self) -> GridResult<HashMap<String, f64>> {
            self.check_reads().await?;
            Ok(self.mids.lock().await.clone())
        }

        async fn perp_size_decimals(&self) -> GridResult<HashMap<String, u32>> {
            self.check_reads().await?;
            Ok(self.sz_decimals.lock().await.clone())
        }

        async fn positions(&self) -> GridResult<Vec<Position>> {
            self.check_reads().await?;
            Ok(self.positions.lock().await.clone())
        }

        async fn open_orders(&self) -> GridResult<Vec<OpenOrder>> {
            self.check_reads().await?;
            Ok(self.open_orders.lock().await.clone())
        }

        async fn place_limit_order(&self, order: &LimitOrderRequest) -> GridResult<OrderResult> {
            if self.rejected_prices.lock().await.contains(&order.price) {
                return Err(GridError::Rejected("Insufficient margin to place order".into()));
            }

            self.placed.lock().await.push(order.clone());
            let oid = self.next_oid.fetch_add(1, Ordering::SeqCst);
            self.open_orders.lock().await.push(OpenOrder {
                asset: order.asset.clone(),
                oid,
                side: order.side,
                price: order.price,
                size: order.size,
            });

            Ok(OrderResult {
                oid,
                status: OrderResultStatus::Resting,
            })
        }

        async fn cancel_order(&self, asset: &str, oid: u64) -> GridResult<()> {
            if self.failing_cancels.lock().await.contains(&oid) {
                return Err(GridError::Rejected(format!("Order {} was never placed", oid)));
            }

            self.open_orders.lock().await.retain(|o| o.oid != oid);
            self.cancelled.lock().await.push((asset.to_string(), oid));
            Ok(())
        }

        async fn update_leverage(&self, asset: &str, leverage: u32, is_cross: bool) -> GridResult<()> {
            if *self.reject_leverage.lock().await {
                return Err(GridError::Rejected("Invalid leverage value".into()));
            }
            self.leverage_updates
                .lock()
                .await
                .push((asset.to_string(), leverage, is_cross));
            Ok(())
        }
    }
}
