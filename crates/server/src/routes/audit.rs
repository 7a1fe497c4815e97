//! Audit trail.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::AuditEntry;
use crate::services::AuditService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/audit-logs", get(list_audit_logs))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// Recent entries, newest first. Admin only.
///
/// GET /api/audit-logs?limit=
async fn list_audit_logs(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let entries = AuditService::new(state.store())
        .recent(&user.context(), query.limit)
        .await?;
    Ok(Json(entries))
}
