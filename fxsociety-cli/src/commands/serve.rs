//! HTTP server command for the fxsociety API
//!
//! Loads configuration, connects, migrates, and serves until shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use fxsociety_server::db::{create_pool, migrations};
use fxsociety_server::http::{run_server, ServerConfig};

use super::load_config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Database URL (overrides DATABASE_URL and the development default)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Skip running migrations on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = load_config(args.database_url)?;

    tracing::info!("Starting fxsociety API on {}", args.bind);

    // Create database pool
    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    if !args.skip_migrations {
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let server = ServerConfig {
        bind_addr: args.bind,
    };

    // Run server (blocks until shutdown)
    run_server(pool, config, server)
        .await
        .context("Server error")?;

    Ok(())
}
