//! Account store backends and identity-provider clients.
//!
//! This crate provides:
//! - [`MemoryStore`] - dashmap-backed store for tests and development
//! - [`PgStore`] - Postgres-backed store with conditional balance updates
//! - [`HttpEmailLookup`] - reqwest client for the identity provider

pub mod identity;
pub mod memory;
pub mod postgres;

pub use identity::HttpEmailLookup;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
