//! Request-scoped caller identity.

use waterline_core::{UserId, UserRole};

/// Who is calling a service operation.
///
/// Built from the session by the auth extractors and passed explicitly into
/// every service call; services never read ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user.
    pub user_id: UserId,
    /// Role of the authenticated user.
    pub role: UserRole,
}

impl RequestContext {
    /// Create a context for the given user and role.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}
