//! Session-related types for authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use waterline_core::{UserId, UserRole, Username};

use super::context::RequestContext;
use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Display name.
    pub full_name: String,
    /// Role/permission level.
    pub role: UserRole,
}

impl CurrentUser {
    /// Request context for service calls made on behalf of this user.
    #[must_use]
    pub const fn context(&self) -> RequestContext {
        RequestContext::new(self.id, self.role)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
