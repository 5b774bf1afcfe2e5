//! Command implementations for the fxsociety CLI

pub mod db;
pub mod serve;

use anyhow::{Context, Result};
use fxsociety_server::AppConfig;

// Re-export main dispatcher functions for flat access from main.rs
pub use db::{run_migrate, run_seed};
pub use serve::run_serve;

/// Read configuration from the environment, letting a CLI flag override the
/// database URL.
pub(crate) fn load_config(database_url: Option<String>) -> Result<AppConfig> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = database_url {
        config.database_url = url;
    }
    Ok(config)
}
