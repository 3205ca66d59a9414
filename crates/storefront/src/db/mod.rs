//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Tables
//!
//! - `users` - Site accounts (argon2 password hash, optional reset token)
//! - `products` - Catalog entries, each owned by a user
//! - `cart_items` - Pending cart lines, one row per (user, product)
//! - `orders` - Frozen checkout snapshots (JSONB line copies)
//! - `tower_sessions.session` - Session storage for tower-sessions
//!
//! Queries use the runtime sqlx API with `FromRow` row structs so the crate
//! builds without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cartwheel-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Convert a stored cart quantity, rejecting anything below 1.
///
/// The schema's `CHECK (quantity >= 1)` makes a bad value unreachable, but
/// both readers map one to `DataCorruption` rather than trusting it.
pub(crate) fn cart_quantity(raw: i32) -> Option<u32> {
    u32::try_from(raw).ok().filter(|q| *q >= 1)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_quantity_accepts_positive_values() {
        assert_eq!(cart_quantity(1), Some(1));
        assert_eq!(cart_quantity(42), Some(42));
        assert!(cart_quantity(i32::MAX).is_some());
    }

    #[test]
    fn cart_quantity_rejects_zero_and_negative_values() {
        assert_eq!(cart_quantity(0), None);
        assert_eq!(cart_quantity(-1), None);
        assert_eq!(cart_quantity(i32::MIN), None);
    }
}
