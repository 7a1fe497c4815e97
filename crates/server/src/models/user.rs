//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waterline_core::{UserId, UserRole, Username};

/// A user account (without credentials).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub full_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with their stored password hash.
///
/// Only used during login; never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Input for creating a user account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub full_name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

impl std::fmt::Debug for CreateUserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserInput")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

const fn default_role() -> UserRole {
    UserRole::User
}

/// Validated account ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub full_name: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Login form.
#[derive(Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
