//! Account management.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use waterline_core::UserId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CreateUserInput, User};
use crate::services::UserService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
}

/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserService::new(state.store(), state.audit())
        .list(&user.context())
        .await?;
    Ok(Json(users))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let created = UserService::new(state.store(), state.audit())
        .create(&user.context(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/users/:id
async fn get_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let found = UserService::new(state.store(), state.audit())
        .get(&user.context(), id)
        .await?;
    Ok(Json(found))
}

/// DELETE /api/users/:id
async fn delete_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    UserService::new(state.store(), state.audit())
        .delete(&user.context(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
