//! Login, logout and the current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::error;

use crate::error::AppError;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, LoginInput};
use crate::services::UserService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Check credentials and start a session.
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginInput>,
) -> Result<Json<CurrentUser>, AppError> {
    let user = UserService::new(state.store(), state.audit())
        .login(&input)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await.map_err(|e| {
        error!(error = %e, "Failed to store session");
        AppError::Internal("session error".to_string())
    })?;

    Ok(Json(current))
}

/// End the session.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> StatusCode {
    let _ = clear_current_user(&session).await;
    StatusCode::NO_CONTENT
}

/// GET /api/auth/me
async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
