//! Handler for the edge-cached directory payload.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Response, StatusCode, header},
};
use serde_json::json;

use crate::application::services::ServedPayload;
use crate::error::AppError;
use crate::state::AppState;

/// Custom header carrying the stored version timestamp (RFC 3339).
pub const UPDATED_AT_HEADER: &str = "x-bangs-updated-at";
/// Custom header carrying the stored content hash.
pub const HASH_HEADER: &str = "x-bangs-hash";

/// Serves the bang directory payload.
///
/// # Endpoint
///
/// `GET /bangs.js`
///
/// # Caching
///
/// Served from the edge cache when both payload and version are present;
/// otherwise fetched upstream, fingerprinted and cached. Responses carry
/// `Cache-Control: public, max-age=86400`, an `ETag` built from the content
/// hash, and the raw version metadata in custom headers. A request whose
/// `If-None-Match` matches the current ETag receives `304 Not Modified`.
///
/// # Errors
///
/// An upstream failure with an empty cache propagates the upstream status
/// code (502 when the failure carried none).
pub async fn bangs_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response<Body>, AppError> {
    let served = state.edge.payload().await?;
    let etag = format!("\"{}\"", served.version.content_hash);

    let revalidated = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|candidate| candidate == etag);

    if revalidated {
        return build_response(StatusCode::NOT_MODIFIED, &etag, &served, Body::empty());
    }

    let body = Body::from(served.body.clone());
    build_response(StatusCode::OK, &etag, &served, body)
}

fn build_response(
    status: StatusCode,
    etag: &str,
    served: &ServedPayload,
    body: Body,
) -> Result<Response<Body>, AppError> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/javascript; charset=utf-8")
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .header(header::ETAG, etag)
        .header(UPDATED_AT_HEADER, served.version.timestamp.to_rfc3339())
        .header(HASH_HEADER, served.version.content_hash.as_str())
        .body(body)
        .map_err(|e| {
            AppError::internal("Failed to build payload response", json!({ "reason": e.to_string() }))
        })
}
