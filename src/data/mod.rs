//! Data layer module
//!
//! Handles all data persistence and caching:
//! - SQLite database operations
//! - Upstream response cache (volatile)
//! - Built-in reference districts

mod cache;
mod database;
mod models;
mod seed;

pub use cache::{DEFAULT_TTL, ResponseCache, TtlCache};
pub use database::Database;
pub use models::*;
pub use seed::REFERENCE_DISTRICTS;
