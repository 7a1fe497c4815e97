//! Database operations for `PostgreSQL`.
//!
//! # Schema: `waterline`
//!
//! ## Tables
//!
//! - `app_user` - Accounts with Argon2id password hashes
//! - `session` - tower-sessions storage
//! - `catalog_entry` - Sources, barangays, puroks, sheets, categories, suppliers, items
//! - `inventory` - Stock on hand per item and supplier
//! - `sale` - Immutable sales with point-in-time profit
//! - `map_shape` - GeoJSON annotations
//! - `pipe_log` - Append-only pipe size history per shape
//! - `note` - Field notes
//! - `conversation`, `message` - Two-party messaging
//! - `audit_log` - Best-effort who-did-what records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p waterline-cli -- migrate
//! ```

pub mod audit;
pub mod catalog;
pub mod inventory;
pub mod messages;
pub mod notes;
pub mod sales;
pub mod shapes;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::store::HealthStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate username, row still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a sqlx error, turning constraint violations into `Conflict`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            // 22003: numeric_value_out_of_range
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
                || db_err.code().as_deref() == Some("22003")
            {
                return Self::Conflict(conflict.to_string());
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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

/// `PostgreSQL`-backed implementation of every store trait.
///
/// Each submodule of [`crate::db`] implements one trait for this type.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool (used by the session store).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HealthStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
