//! Sales.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use waterline_core::SaleId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CreateSaleInput, Sale, SaleFilter};
use crate::services::SalesService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sales", get(list_sales).post(create_sale))
        .route("/api/sales/{id}", get(get_sale))
}

/// GET /api/sales
async fn list_sales(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<SaleFilter>,
) -> Result<Json<Vec<Sale>>, AppError> {
    let sales = SalesService::new(state.store(), state.audit())
        .list(&user.context(), filter)
        .await?;
    Ok(Json(sales))
}

/// Sell from an inventory record. 409 if stock is short.
///
/// POST /api/sales
async fn create_sale(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateSaleInput>,
) -> Result<(StatusCode, Json<Sale>), AppError> {
    let sale = SalesService::new(state.store(), state.audit())
        .create(&user.context(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET /api/sales/:id
async fn get_sale(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<SaleId>,
) -> Result<Json<Sale>, AppError> {
    let sale = SalesService::new(state.store(), state.audit())
        .get(&user.context(), id)
        .await?;
    Ok(Json(sale))
}
