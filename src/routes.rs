//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /`          - Bang query resolution / default page (public)
//! - `GET /bangs.js`  - Edge-cached directory payload (public)
//! - `GET /health`    - Health check: directory, edge cache (public)
//! - `GET /static/*`  - Static assets
//! - anything else    - Generic 404
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{bangs_handler, health_handler, resolve_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/", get(resolve_handler))
        .route("/bangs.js", get(bangs_handler))
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
