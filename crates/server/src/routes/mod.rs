//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (store reachable)
//!
//! # Auth
//! POST /api/auth/login                  - Start a session
//! POST /api/auth/logout                 - End the session
//! GET  /api/auth/me                     - Current user
//!
//! # Users (admin)
//! GET|POST   /api/users
//! GET|DELETE /api/users/{id}
//!
//! # Catalog (writes: admin)
//! GET|POST       /api/catalog/{kind}
//! GET|PUT|DELETE /api/catalog/{kind}/{id}
//!
//! # Inventory (writes: admin; PUT restocks)
//! GET|POST       /api/inventory
//! GET|PUT|DELETE /api/inventory/{id}
//!
//! # Sales (writes: admin)
//! GET|POST /api/sales
//! GET      /api/sales/{id}
//!
//! # Map (writes: engr, admin)
//! GET|POST       /api/shapes
//! GET|PUT|DELETE /api/shapes/{id}
//! GET|POST       /api/shapes/{id}/logs
//! GET|POST       /api/notes
//! GET|PUT|DELETE /api/notes/{id}
//!
//! # Messaging (participants)
//! GET|POST /api/conversations
//! GET|POST /api/conversations/{id}/messages
//! GET      /api/conversations/{id}/events   - SSE
//!
//! # Audit (admin)
//! GET /api/audit-logs?limit=
//! ```
//!
//! Handlers only extract, call a service and wrap the result; role checks
//! live in the services.

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod inventory;
pub mod messages;
pub mod notes;
pub mod sales;
pub mod shapes;
pub mod users;

use axum::Router;
use axum::http::{HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// All routes, without state or layers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(catalog::router())
        .merge(inventory::router())
        .merge(sales::router())
        .merge(shapes::router())
        .merge(notes::router())
        .merge(messages::router())
        .merge(audit::router())
}

/// The application: routes, request tracing and security headers.
///
/// The caller adds the session layer, which differs between production
/// (`PostgreSQL`) and tests (in memory).
pub fn app(state: AppState) -> Router {
    routes()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
