use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use config::{Config, File};
pub use config::ConfigError;
use hyperliquid_rust_sdk::BaseUrl;
use serde::Deserialize;

use crate::grid::{GridError, GridParameters, GridResult, RunnerConfig};

/// Environment variable that replaces the credentials file's key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Main configuration struct
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Network configuration (env, credentials)
    #[serde(default)]
    pub network: NetworkConfig,
    /// Grid parameters
    pub strategy: GridParameters,
    /// Cycle timing
    #[serde(default)]
    pub runner: RunnerSettings,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// Environment: "mainnet", "testnet" or "localhost"
    #[serde(default = "default_env")]
    pub env: String,
    /// Path to the JSON credentials file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            credentials_file: default_credentials_file(),
        }
    }
}

fn default_env() -> String {
    "testnet".to_string()
}

fn default_credentials_file() -> String {
    "config.json".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RunnerSettings {
    /// Seconds between cycles
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    /// Milliseconds to pause after each exchange write
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            cycle_interval_secs: default_cycle_interval_secs(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

fn default_cycle_interval_secs() -> u64 {
    3600
}

fn default_pacing_ms() -> u64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also append log lines to this file
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load settings from a configuration file
    pub fn new(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(config_path))
            // e.g. APP__STRATEGY__NUM_ORDERS=6
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn base_url(&self) -> GridResult<BaseUrl> {
        match self.network.env.to_lowercase().as_str() {
            "mainnet" => Ok(BaseUrl::Mainnet),
            "testnet" => Ok(BaseUrl::Testnet),
            "localhost" | "local" => Ok(BaseUrl::Localhost),
            other => Err(GridError::InvalidConfig(format!(
                "unknown network env {:?}, expected mainnet, testnet or localhost",
                other
            ))),
        }
    }

    pub fn is_mainnet(&self) -> bool {
        self.network.env.eq_ignore_ascii_case("mainnet")
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            cycle_interval: Duration::from_secs(self.runner.cycle_interval_secs),
            pacing: Duration::from_millis(self.runner.pacing_ms),
        }
    }
}

/// Signing key and optional trading account, stored as JSON
///
/// A blank `account_address` means the signer trades for itself. Otherwise
/// the signer is an agent wallet acting for that account.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub secret_key: String,
    #[serde(default)]
    pub account_address: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_key", &"<redacted>")
            .field("account_address", &self.account_address)
            .finish()
    }
}

impl Credentials {
    pub fn load(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replace the key when `secret_key` is present and non-blank
    pub fn with_secret_key_override(mut self, secret_key: Option<String>) -> Self {
        if let Some(key) = secret_key.filter(|k| !k.trim().is_empty()) {
            self.secret_key = key;
        }
        self
    }

    /// Apply the `PRIVATE_KEY` environment override
    pub fn with_env_override(self) -> Self {
        self.with_secret_key_override(std::env::var(PRIVATE_KEY_ENV).ok())
    }

    pub fn signer(&self) -> GridResult<PrivateKeySigner> {
        let key = self.secret_key.trim();
        if key.is_empty() {
            return Err(GridError::Credentials("secret_key is empty".into()));
        }
        key.parse()
            .map_err(|e| GridError::Credentials(format!("invalid secret_key: {}", e)))
    }

    /// Account to trade for; the signer's own address when none is configured
    pub fn account_address(&self, signer: &PrivateKeySigner) -> GridResult<Address> {
        let configured = self.account_address.trim();
        if configured.is_empty() {
            return Ok(signer.address());
        }
        configured.parse().map_err(|e| {
            GridError::Credentials(format!("invalid account_address {:?}: {}", configured, e))
        })
    }
}
