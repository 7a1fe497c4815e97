//! Map notes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use waterline_core::NoteId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Note, NoteInput};
use crate::services::NoteService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
}

/// GET /api/notes
async fn list_notes(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = NoteService::new(state.store(), state.audit())
        .list(&user.context())
        .await?;
    Ok(Json(notes))
}

/// POST /api/notes
async fn create_note(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<NoteInput>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = NoteService::new(state.store(), state.audit())
        .create(&user.context(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes/:id
async fn get_note(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<NoteId>,
) -> Result<Json<Note>, AppError> {
    let note = NoteService::new(state.store(), state.audit())
        .get(&user.context(), id)
        .await?;
    Ok(Json(note))
}

/// PUT /api/notes/:id
async fn update_note(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<NoteId>,
    Json(input): Json<NoteInput>,
) -> Result<Json<Note>, AppError> {
    let note = NoteService::new(state.store(), state.audit())
        .update(&user.context(), id, input)
        .await?;
    Ok(Json(note))
}

/// DELETE /api/notes/:id
async fn delete_note(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<NoteId>,
) -> Result<StatusCode, AppError> {
    NoteService::new(state.store(), state.audit())
        .delete(&user.context(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
