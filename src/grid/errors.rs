//! Grid-specific error types

use thiserror::Error;

/// Errors that can occur in grid trading operations
#[derive(Error, Debug, Clone)]
pub enum GridError {
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Transport or protocol failure talking to the exchange
    #[error("Exchange error: {0}")]
    Exchange(String),

    /// The exchange answered but refused the request
    #[error("Exchange rejected request: {0}")]
    Rejected(String),

    #[error("Cannot represent {value} as a decimal for {context}")]
    InvalidNumber { context: &'static str, value: f64 },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("SDK error: {0}")]
    Sdk(String),
}

impl GridError {
    /// A single exchange call failed; the surrounding batch keeps going.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GridError::Exchange(_) | GridError::Rejected(_) | GridError::Sdk(_)
        )
    }

    /// The run is misconfigured (unknown asset, bad settings or credentials).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GridError::AssetNotFound(_)
                | GridError::InvalidConfig(_)
                | GridError::Credentials(_)
                | GridError::Settings(_)
        )
    }
}

impl From<hyperliquid_rust_sdk::Error> for GridError {
    fn from(err: hyperliquid_rust_sdk::Error) -> Self {
        GridError::Sdk(err.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::JsonParse(err.to_string())
    }
}

/// Result type for grid operations
pub type GridResult<T> = std::result::Result<T, GridError>;
