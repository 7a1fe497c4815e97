//! User bootstrap commands.
//!
//! The HTTP API only lets admins create accounts, so the first admin is
//! created here.
//!
//! # Usage
//!
//! ```bash
//! WATERLINE_USER_PASSWORD=... wl-cli user create -u admin -n "District Admin" -r admin
//! ```

use thiserror::Error;

use waterline_core::{UserId, UserRole, Username, UsernameError};
use waterline_server::db::{self, PgStore, RepositoryError};
use waterline_server::models::NewUser;
use waterline_server::services::ServiceError;
use waterline_server::services::users::{hash_password, validate_password};
use waterline_server::store::UserStore;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid role: {0}. Valid roles: admin, engr, user")]
    InvalidRole(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("{0}")]
    Rejected(#[from] ServiceError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Create a user directly in the database.
///
/// # Errors
///
/// Returns `UserError` for invalid input, a taken username or a database
/// failure.
pub async fn create(
    username: &str,
    full_name: &str,
    role: &str,
    password: &str,
) -> Result<UserId, UserError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let username = Username::parse(username)?;
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(ServiceError::Validation("full name must not be empty".to_owned()).into());
    }
    validate_password(password)?;

    let database_url =
        super::database_url().ok_or(UserError::MissingEnvVar("WATERLINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let store = PgStore::new(db::create_pool(&database_url).await?);

    tracing::info!("Creating user: {} ({})", username, role);
    let user = store
        .insert_user(&NewUser {
            username,
            full_name: full_name.to_owned(),
            password_hash: hash_password(password)?,
            role,
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user.id)
}
