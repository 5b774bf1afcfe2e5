//! Route handlers organized by resource

pub mod auth;
pub mod crm;
pub mod health;
pub mod orders;
pub mod products;
pub mod tickets;
