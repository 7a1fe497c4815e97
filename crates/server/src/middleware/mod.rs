//! HTTP middleware: sessions and authentication extractors.

pub mod auth;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
