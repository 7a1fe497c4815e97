//! Authentication extractors and session helpers.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;
use crate::store::UserStore;

/// Extractor that requires a logged-in user.
///
/// The account is reloaded from the store on every request. A session whose
/// user has been deleted is flushed and rejected.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.full_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))?;

        let current: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))?;

        let Some(user) = state.store().get_user(current.id).await? else {
            warn!(user_id = %current.id, "Session refers to a deleted user");
            if let Err(e) = clear_current_user(session).await {
                warn!(error = %e, user_id = %current.id, "Failed to clear stale session");
            }
            return Err(AppError::Unauthorized("not logged in".to_string()));
        };

        set_sentry_user(user.id.as_i32(), user.username.as_str());
        Ok(Self(CurrentUser::from(&user)))
    }
}

/// Store the logged-in user in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    set_sentry_user(user.id.as_i32(), user.username.as_str());
    Ok(())
}

/// Drop the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}
