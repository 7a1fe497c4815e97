//! User roles and the permissions they carry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, Error)]
#[error("invalid role: {0} (expected admin, engr or user)")]
pub struct ParseRoleError(pub String);

/// Role assigned to every account.
///
/// Roles are ordered by privilege: `User` < `Engr` < `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "waterline.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Read-only access to district data plus messaging.
    User,
    /// Field engineer: may edit the map (shapes, pipe logs, notes).
    Engr,
    /// Full access including catalog, inventory, sales and accounts.
    Admin,
}

impl UserRole {
    /// Whether this role may create, edit or delete map annotations.
    #[must_use]
    pub const fn can_edit_map(self) -> bool {
        matches!(self, Self::Engr | Self::Admin)
    }

    /// Whether this role may manage catalog, inventory, sales and users.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Engr => write!(f, "engr"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "engr" | "engineer" => Ok(Self::Engr),
            "user" => Ok(Self::User),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}
