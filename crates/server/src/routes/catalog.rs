//! Reference data: barangays, puroks, sheets, sources, categories,
//! suppliers and items.
//!
//! The kind is the first path segment and may be singular or plural
//! (`/api/catalog/purok`, `/api/catalog/puroks`).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use waterline_core::{CatalogEntryId, CatalogKind};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CatalogEntry, CatalogInput};
use crate::services::CatalogService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/catalog/{kind}", get(list_entries).post(create_entry))
        .route(
            "/api/catalog/{kind}/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub parent_id: Option<CatalogEntryId>,
}

fn parse_kind(segment: &str) -> Result<CatalogKind, AppError> {
    segment.parse().map_err(AppError::NotFound)
}

/// GET /api/catalog/:kind
async fn list_entries(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(kind): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let kind = parse_kind(&kind)?;
    let entries = CatalogService::new(state.store(), state.audit())
        .list(&user.context(), kind, query.parent_id)
        .await?;
    Ok(Json(entries))
}

/// POST /api/catalog/:kind
async fn create_entry(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(kind): Path<String>,
    Json(input): Json<CatalogInput>,
) -> Result<(StatusCode, Json<CatalogEntry>), AppError> {
    let kind = parse_kind(&kind)?;
    let entry = CatalogService::new(state.store(), state.audit())
        .create(&user.context(), kind, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/catalog/:kind/:id
async fn get_entry(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((kind, id)): Path<(String, CatalogEntryId)>,
) -> Result<Json<CatalogEntry>, AppError> {
    let kind = parse_kind(&kind)?;
    let entry = CatalogService::new(state.store(), state.audit())
        .get(&user.context(), kind, id)
        .await?;
    Ok(Json(entry))
}

/// PUT /api/catalog/:kind/:id
async fn update_entry(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((kind, id)): Path<(String, CatalogEntryId)>,
    Json(input): Json<CatalogInput>,
) -> Result<Json<CatalogEntry>, AppError> {
    let kind = parse_kind(&kind)?;
    let entry = CatalogService::new(state.store(), state.audit())
        .update(&user.context(), kind, id, input)
        .await?;
    Ok(Json(entry))
}

/// DELETE /api/catalog/:kind/:id
async fn delete_entry(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((kind, id)): Path<(String, CatalogEntryId)>,
) -> Result<StatusCode, AppError> {
    let kind = parse_kind(&kind)?;
    CatalogService::new(state.store(), state.audit())
        .delete(&user.context(), kind, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
