//! fxsociety-server: storefront and admin CRM API
//!
//! Serves the product catalog, guest orders with public tracking codes,
//! customer accounts and support tickets, and the admin CRM (tags, notes,
//! activity log) over a single PostgreSQL database.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod seed;

pub use config::{AppConfig, ConfigError};
pub use http::{build_router, run_server, AppState, ServerConfig};
