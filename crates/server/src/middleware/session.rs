//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions
//! (SameSite=Strict, 24hr inactivity expiry).

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "waterline_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The session table is created by migration in the `waterline` schema.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "waterline" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AppConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("waterline")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
