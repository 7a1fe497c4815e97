//! Inventory records and restocking.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;

use waterline_core::InventoryId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CreateInventoryInput, InventoryFilter, InventoryRecord, RestockInput};
use crate::services::InventoryService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/inventory", get(list_inventory).post(create_inventory))
        .route(
            "/api/inventory/{id}",
            get(get_inventory).put(restock).delete(delete_inventory),
        )
}

/// Inventory record with its stock value.
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    #[serde(flatten)]
    pub record: InventoryRecord,
    /// `quantity × price`; `null` if it does not fit in a decimal.
    pub amount: Option<Decimal>,
}

impl From<InventoryRecord> for InventoryResponse {
    fn from(record: InventoryRecord) -> Self {
        Self {
            amount: record.amount(),
            record,
        }
    }
}

/// GET /api/inventory
async fn list_inventory(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<InventoryFilter>,
) -> Result<Json<Vec<InventoryResponse>>, AppError> {
    let records = InventoryService::new(state.store(), state.audit())
        .list(&user.context(), filter)
        .await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /api/inventory
async fn create_inventory(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateInventoryInput>,
) -> Result<(StatusCode, Json<InventoryResponse>), AppError> {
    let record = InventoryService::new(state.store(), state.audit())
        .create(&user.context(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /api/inventory/:id
async fn get_inventory(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<InventoryId>,
) -> Result<Json<InventoryResponse>, AppError> {
    let record = InventoryService::new(state.store(), state.audit())
        .get(&user.context(), id)
        .await?;
    Ok(Json(record.into()))
}

/// Add stock, replacing price and supplier.
///
/// PUT /api/inventory/:id
async fn restock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<InventoryId>,
    Json(input): Json<RestockInput>,
) -> Result<Json<InventoryResponse>, AppError> {
    let record = InventoryService::new(state.store(), state.audit())
        .restock(&user.context(), id, input)
        .await?;
    Ok(Json(record.into()))
}

/// DELETE /api/inventory/:id
async fn delete_inventory(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<InventoryId>,
) -> Result<StatusCode, AppError> {
    InventoryService::new(state.store(), state.audit())
        .delete(&user.context(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
