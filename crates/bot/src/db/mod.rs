//! Database operations for the Packshop SQLite store.
//!
//! # Tables
//!
//! - `products` / `packs` - the catalog (packs cascade on product delete)
//! - `users` - chat identities plus incrementally-filled shipping profiles
//! - `cart_entries` - per-user carts with a merge key on (user, product, pack)
//! - `orders` - frozen line-item snapshots driven through the status machine
//!
//! # Migrations
//!
//! Migrations are stored in `crates/bot/migrations/` and run via:
//! ```bash
//! cargo run -p packshop-cli -- migrate
//! ```
//!
//! All queries are runtime-checked; each repository reads private row
//! structs and converts them into the domain types in [`crate::models`].

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod stats;
pub mod users;

pub use cart::CartRepository;
pub use catalog::CatalogRepository;
pub use orders::{LifecycleError, OrderRepository};
pub use stats::{Statistics, StatsRepository};
pub use users::UserRepository;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be interpreted (bad status string, broken
    /// line-item blob).
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,

    /// Input violated a store-level range check (e.g. non-positive pack
    /// quantity).
    #[error("constraint violation: {0}")]
    Constraint(&'static str),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// Foreign keys are enabled on every connection so the pack cascade works;
/// the database file is created on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
