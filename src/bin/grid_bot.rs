//! Grid Trading Bot Binary
//!
//! Cancels and re-lays a ladder of perp limit orders every cycle, with a
//! reduce-only take-profit on the open position.
//!
//! ## Setup
//!
//! 1. Copy `config.example.toml` to `config.toml` and adjust `[strategy]`.
//! 2. Create the credentials file named by `[network].credentials_file`:
//!    ```json
//!    {"secret_key": "0xYourPrivateKeyHere", "account_address": ""}
//!    ```
//!    Leave `account_address` blank unless the key is an agent wallet.
//!    `PRIVATE_KEY` in the environment or a `.env` file overrides the key.
//! 3. Run the bot:
//!    ```bash
//!    cargo run --bin grid_bot -- --config config.toml
//!    ```

use std::env;
use std::sync::Arc;

use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use hyperliquid_grid_bot::{
    config::{Credentials, Settings, PRIVATE_KEY_ENV},
    grid::{GridRunner, HyperliquidExchange, MarketData, TokioSleeper},
    logging,
};
use hyperliquid_rust_sdk::{ExchangeClient, InfoClient};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Installed before any network call so an early Ctrl-C still exits cleanly
    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let dotenv = dotenvy::dotenv();

    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() > 2 && args[1] == "--config" {
        args[2].as_str()
    } else {
        DEFAULT_CONFIG_PATH
    };

    let settings = match Settings::new(config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load config '{}': {}", config_path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(&settings.log) {
        eprintln!("Failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    match dotenv {
        Ok(path) => info!("Loaded environment from: {}", path.display()),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let mut runner = tokio::select! {
        biased;
        _ = token.cancelled() => {
            info!("Interrupted during startup");
            return;
        }
        result = start(&settings) => match result {
            Ok(runner) => runner,
            Err(e) => {
                error!("Bot startup error: {}", e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = runner.run(token).await {
        error!("Bot execution error: {}", e);
        std::process::exit(1);
    }
}

fn load_credentials(path: &str) -> Result<Credentials, Box<dyn std::error::Error>> {
    match Credentials::load(path) {
        Ok(creds) => Ok(creds.with_env_override()),
        Err(e) => match env::var(PRIVATE_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => {
                warn!("{}; using {} from the environment", e, PRIVATE_KEY_ENV);
                Ok(Credentials {
                    secret_key: key,
                    account_address: String::new(),
                })
            }
            _ => Err(e.into()),
        },
    }
}

/// Connect, fetch metadata and build the runner
async fn start(
    settings: &Settings,
) -> Result<GridRunner<HyperliquidExchange, TokioSleeper>, Box<dyn std::error::Error>> {
    let base_url = settings.base_url()?;
    if settings.is_mainnet() {
        warn!("Using MAINNET - real funds at risk");
    } else {
        info!("Using {}", settings.network.env.to_uppercase());
    }

    let credentials = load_credentials(&settings.network.credentials_file)?;
    let wallet = credentials.signer()?;
    let account_address = credentials.account_address(&wallet)?;

    let params = &settings.strategy;
    info!("Asset: {}", params.asset);
    info!("Side: {}", params.side);
    info!("Base position size: {}", params.position_size);
    info!("Number of orders: {}", params.num_orders);
    info!(
        "Spacing: {}% ({:?}, multiplier {})",
        params.spacing_percentage, params.spacing_mode, params.spacing_multiplier
    );
    info!("Size multiplier: {}", params.size_multiplier);
    info!(
        "Leverage: {}x {}",
        params.leverage,
        if params.cross_margin { "cross" } else { "isolated" }
    );
    info!("Take profit markup: {}%", params.take_profit_markup_percentage);

    let info_client = InfoClient::new(None, Some(base_url)).await?;
    let exchange_client = ExchangeClient::new(None, wallet, Some(base_url), None, None).await?;
    let exchange = Arc::new(HyperliquidExchange::new(
        exchange_client,
        info_client,
        account_address,
    ));

    if exchange.account_address() == exchange.signer_address() {
        info!("Trading account: {}", exchange.account_address());
    } else {
        info!(
            "Agent wallet {} trading for account {}",
            exchange.signer_address(),
            exchange.account_address()
        );
    }

    let metadata = MarketData::new(exchange.clone()).load_asset_metadata().await?;
    if let Some(sz_decimals) = metadata.sz_decimals(&params.asset) {
        info!("Size decimals for {}: {}", params.asset, sz_decimals);
    }

    let runner = GridRunner::new(
        exchange,
        Arc::new(TokioSleeper),
        metadata,
        settings.strategy.clone(),
        settings.runner_config(),
    )?;
    Ok(runner)
}
