#![deny(unreachable_pub)]
pub mod config;
pub mod grid;
pub mod logging;

pub use crate::config::{Credentials, Settings};
pub use grid::{GridError, GridParameters, GridResult, GridRunner, RunnerConfig};
