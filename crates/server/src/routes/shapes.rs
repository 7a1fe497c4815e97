//! Map shapes and their pipe logs.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use waterline_core::ShapeId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{AppendPipeLogInput, MapShape, PipeLog, ShapeInput};
use crate::services::ShapeService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shapes", get(list_shapes).post(create_shape))
        .route(
            "/api/shapes/{id}",
            get(get_shape).put(update_shape).delete(delete_shape),
        )
        .route("/api/shapes/{id}/logs", get(list_logs).post(append_log))
}

/// Result of appending a pipe log: the new row and the shape as it now reads.
#[derive(Debug, Serialize)]
pub struct AppendLogResponse {
    pub shape: MapShape,
    pub log: PipeLog,
}

/// GET /api/shapes
async fn list_shapes(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<MapShape>>, AppError> {
    let shapes = ShapeService::new(state.store(), state.audit())
        .list(&user.context())
        .await?;
    Ok(Json(shapes))
}

/// POST /api/shapes
async fn create_shape(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<ShapeInput>,
) -> Result<(StatusCode, Json<MapShape>), AppError> {
    let shape = ShapeService::new(state.store(), state.audit())
        .create(&user.context(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(shape)))
}

/// GET /api/shapes/:id
async fn get_shape(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ShapeId>,
) -> Result<Json<MapShape>, AppError> {
    let shape = ShapeService::new(state.store(), state.audit())
        .get(&user.context(), id)
        .await?;
    Ok(Json(shape))
}

/// PUT /api/shapes/:id
async fn update_shape(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ShapeId>,
    Json(input): Json<ShapeInput>,
) -> Result<Json<MapShape>, AppError> {
    let shape = ShapeService::new(state.store(), state.audit())
        .update(&user.context(), id, input)
        .await?;
    Ok(Json(shape))
}

/// DELETE /api/shapes/:id
async fn delete_shape(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ShapeId>,
) -> Result<StatusCode, AppError> {
    ShapeService::new(state.store(), state.audit())
        .delete(&user.context(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pipe log history, oldest first.
///
/// GET /api/shapes/:id/logs
async fn list_logs(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ShapeId>,
) -> Result<Json<Vec<PipeLog>>, AppError> {
    let logs = ShapeService::new(state.store(), state.audit())
        .logs(&user.context(), id)
        .await?;
    Ok(Json(logs))
}

/// Record a pipe size change.
///
/// POST /api/shapes/:id/logs
async fn append_log(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ShapeId>,
    Json(input): Json<AppendPipeLogInput>,
) -> Result<(StatusCode, Json<AppendLogResponse>), AppError> {
    let (shape, log) = ShapeService::new(state.store(), state.audit())
        .append_log(&user.context(), id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(AppendLogResponse { shape, log })))
}
