//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - One shared pool; repositories borrow it
//! - List operations use JOINs - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Mutations and their activity entries share a transaction

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_lazy_pool, create_pool, create_pool_with_options};
pub use repos::*;
