//! Database maintenance commands - migrate and seed

use anyhow::{Context, Result};
use clap::Parser;

use fxsociety_server::db::{create_pool, migrations};
use fxsociety_server::seed;

use super::load_config;

/// Arguments shared by the database commands
#[derive(Parser, Debug)]
pub struct DbArgs {
    /// Database URL (overrides DATABASE_URL and the development default)
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Create tables and indexes
pub async fn run_migrate(args: DbArgs) -> Result<()> {
    let config = load_config(args.database_url)?;
    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    println!("Migrations applied");
    Ok(())
}

/// Migrate, then insert the demo catalog
pub async fn run_seed(args: DbArgs) -> Result<()> {
    let config = load_config(args.database_url)?;
    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    let inserted = seed::run(&pool).await.context("Failed to seed catalog")?;
    if inserted == 0 {
        println!("Catalog already seeded, nothing to do");
    } else {
        println!("Seeded {inserted} products");
    }
    Ok(())
}
