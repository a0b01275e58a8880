//! Grid bot runner - hourly cancel/replace loop

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use super::clock::Sleeper;
use super::config::GridParameters;
use super::errors::GridResult;
use super::executor::GridExchange;
use super::market_data::MarketData;
use super::orders::{OrderExecutor, DEFAULT_PACING};
use super::precision::AssetMetadata;
use super::types::PlacementSummary;

/// Grid bot runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Wait between the end of one cycle and the start of the next
    pub cycle_interval: Duration,
    /// Pause after every exchange write
    pub pacing: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(3600),
            pacing: DEFAULT_PACING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Running,
    Terminated,
}

/// Summary of one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cancelled: u32,
    pub placement: PlacementSummary,
    pub take_profit_placed: bool,
}

pub struct GridRunner<E: GridExchange, S: Sleeper> {
    executor: OrderExecutor<E, S>,
    market: MarketData<E>,
    sleeper: Arc<S>,
    params: GridParameters,
    config: RunnerConfig,
    state: RunnerState,
}

impl<E: GridExchange, S: Sleeper> GridRunner<E, S> {
    pub fn new(
        exchange: Arc<E>,
        sleeper: Arc<S>,
        metadata: AssetMetadata,
        params: GridParameters,
        config: RunnerConfig,
    ) -> GridResult<Self> {
        params.validate()?;
        if !metadata.contains(&params.asset) {
            warn!(
                "No size decimals known for {}, falling back to defaults",
                params.asset
            );
        }

        let executor =
            OrderExecutor::new(exchange.clone(), sleeper.clone(), metadata).with_pacing(config.pacing);

        Ok(Self {
            executor,
            market: MarketData::new(exchange),
            sleeper,
            params,
            config,
            state: RunnerState::Running,
        })
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn params(&self) -> &GridParameters {
        &self.params
    }

    /// One full pass: leverage, position, cancel, ladder, take-profit
    pub async fn run_cycle(&self) -> GridResult<CycleReport> {
        let params = &self.params;

        self.executor
            .set_leverage(&params.asset, params.leverage, params.cross_margin)
            .await?;
        self.market.get_position_info(&params.asset).await?;

        let cancelled = self.executor.cancel_all_orders(&params.asset).await?;
        let placement = self.executor.place_grid_orders(params).await?;
        let take_profit = self
            .executor
            .place_take_profit_order(&params.asset, params.take_profit_markup_percentage)
            .await?;

        Ok(CycleReport {
            cancelled,
            placement,
            take_profit_placed: take_profit.is_placed(),
        })
    }

    /// Run cycles until `token` is cancelled
    ///
    /// Cycle failures are logged and the loop still waits out the interval
    /// before retrying.
    pub async fn run(&mut self, token: CancellationToken) -> GridResult<()> {
        info!(
            "Starting grid bot for {} ({} {} orders, every {:?})",
            self.params.asset, self.params.num_orders, self.params.side, self.config.cycle_interval
        );
        self.state = RunnerState::Running;

        while !token.is_cancelled() {
            info!("Starting new grid cycle");

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = self.run_cycle() => match result {
                    Ok(report) => info!(
                        "Cycle complete: cancelled={}, placed={}/{}, take_profit={}",
                        report.cancelled,
                        report.placement.placed,
                        report.placement.attempted,
                        report.take_profit_placed
                    ),
                    Err(e) if e.is_configuration() => {
                        error!("Error in grid cycle, check the configuration: {}", e)
                    }
                    Err(e) => error!("Error in grid cycle: {}", e),
                },
            }

            info!("Waiting {:?} until next cycle", self.config.cycle_interval);
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = self.sleeper.sleep(self.config.cycle_interval) => {}
            }
        }

        self.state = RunnerState::Terminated;
        info!("Grid bot stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::clock::mock::RecordingSleeper;
    use crate::grid::clock::TokioSleeper;
    use crate::grid::errors::GridError;
    use crate::grid::executor::mock::MockExchange;
    use crate::grid::types::{OrderSide, Position};

    const HOUR: Duration = Duration::from_secs(3600);

    fn params() -> GridParameters {
        GridParameters::new("BTC", OrderSide::Buy, 0.002, 3, 1.0).with_leverage(20)
    }

    fn metadata() -> AssetMetadata {
        AssetMetadata::default().with_asset("BTC", 5)
    }

    #[tokio::test]
    async fn test_run_cycle() {
        let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
        exchange.add_open_order("BTC", 100).await;
        exchange
            .set_position(Position {
                asset: "BTC".into(),
                size: 0.004,
                entry_price: Some(50000.0),
                leverage: 20,
            })
            .await;

        let runner = GridRunner::new(
            exchange.clone(),
            Arc::new(RecordingSleeper::new()),
            metadata(),
            params(),
            RunnerConfig::default(),
        )
        .unwrap();

        let report = runner.run_cycle().await.unwrap();
        assert_eq!(
            report,
            CycleReport {
                cancelled: 1,
                placement: PlacementSummary { placed: 3, attempted: 3 },
                take_profit_placed: true,
            }
        );
        assert_eq!(
            exchange.leverage_updates.lock().await.clone(),
            vec![("BTC".to_string(), 20, true)]
        );

        // Three ladder rungs plus the reduce-only exit
        let placed = exchange.placed.lock().await;
        assert_eq!(placed.len(), 4);
        assert!(placed[3].reduce_only);
    }

    #[tokio::test]
    async fn test_second_cycle_replaces_ladder() {
        let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
        let runner = GridRunner::new(
            exchange.clone(),
            Arc::new(RecordingSleeper::new()),
            metadata(),
            params(),
            RunnerConfig::default(),
        )
        .unwrap();

        let first = runner.run_cycle().await.unwrap();
        assert_eq!(first.cancelled, 0);
        assert!(!first.take_profit_placed);

        exchange.set_mid_price("BTC", 60000.0).await;
        let second = runner.run_cycle().await.unwrap();
        assert_eq!(second.cancelled, 3);

        let open: Vec<f64> = exchange.open_orders.lock().await.iter().map(|o| o.price).collect();
        assert_eq!(open, vec![58200.0, 58800.0, 59400.0]);
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_at_construction() {
        let exchange = Arc::new(MockExchange::new());
        let result = GridRunner::new(
            exchange,
            Arc::new(RecordingSleeper::new()),
            metadata(),
            params().with_leverage(0),
            RunnerConfig::default(),
        );
        assert!(matches!(result, Err(GridError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_run_sleeps_between_cycles_until_cancelled() {
        let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
        let token = CancellationToken::new();
        let sleeper = Arc::new(RecordingSleeper::cancel_after(token.clone(), HOUR, 2));

        let mut runner = GridRunner::new(
            exchange.clone(),
            sleeper.clone(),
            metadata(),
            params(),
            RunnerConfig::default(),
        )
        .unwrap();

        runner.run(token).await.unwrap();

        assert_eq!(runner.state(), RunnerState::Terminated);
        assert_eq!(sleeper.count_at_least(HOUR), 2);
        assert_eq!(exchange.leverage_updates.lock().await.len(), 2);
        assert_eq!(exchange.placed.lock().await.len(), 6);
    }

    #[tokio::test]
    async fn test_missing_asset_does_not_stop_loop() {
        let exchange = Arc::new(MockExchange::with_asset("ETH", 2000.0, 4).await);
        let token = CancellationToken::new();
        let sleeper = Arc::new(RecordingSleeper::cancel_after(token.clone(), HOUR, 3));

        let mut runner = GridRunner::new(
            exchange.clone(),
            sleeper.clone(),
            metadata(),
            params(),
            RunnerConfig::default(),
        )
        .unwrap();

        let err = runner.run_cycle().await.unwrap_err();
        assert!(matches!(err, GridError::AssetNotFound(_)));

        runner.run(token).await.unwrap();

        // Every failed cycle still waits out the full interval
        assert_eq!(sleeper.count_at_least(HOUR), 3);
        assert!(exchange.placed.lock().await.is_empty());
        assert_eq!(runner.state(), RunnerState::Terminated);
    }

    #[tokio::test]
    async fn test_read_failure_is_a_cycle_error() {
        let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
        exchange.set_should_fail_reads(true).await;
        let runner = GridRunner::new(
            exchange.clone(),
            Arc::new(RecordingSleeper::new()),
            metadata(),
            params(),
            RunnerConfig::default(),
        )
        .unwrap();

        assert!(runner.run_cycle().await.unwrap_err().is_transient());
        assert!(exchange.placed.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_runs_nothing() {
        let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
        let token = CancellationToken::new();
        token.cancel();

        let mut runner = GridRunner::new(
            exchange.clone(),
            Arc::new(RecordingSleeper::new()),
            metadata(),
            params(),
            RunnerConfig::default(),
        )
        .unwrap();

        runner.run(token).await.unwrap();
        assert!(exchange.leverage_updates.lock().await.is_empty());
        assert_eq!(runner.state(), RunnerState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_hourly_sleep() {
        let exchange = Arc::new(MockExchange::with_asset("BTC", 50000.0, 5).await);
        let token = CancellationToken::new();
        let config = RunnerConfig {
            cycle_interval: HOUR,
            pacing: Duration::ZERO,
        };

        let mut runner =
            GridRunner::new(exchange.clone(), Arc::new(TokioSleeper), metadata(), params(), config)
                .unwrap();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let start = tokio::time::Instant::now();
        runner.run(token).await.unwrap();

        assert!(start.elapsed() < HOUR);
        assert_eq!(exchange.leverage_updates.lock().await.len(), 1);
    }
}
