//! Handler for bang query resolution.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::api::dto::resolve::ResolveParams;
use crate::application::services::resolver::resolve;
use crate::domain::entities::Resolution;
use crate::state::AppState;
use crate::web::handlers::HomeTemplate;

/// Resolves a search query into a redirect.
///
/// # Endpoint
///
/// `GET /?q=...`
///
/// # Request Flow
///
/// 1. Load the current directory snapshot (fresh cache, or a single-flight
///    fetch through the edge proxy with stale/embedded fallback)
/// 2. Resolve the query against the snapshot
/// 3. Redirect to the destination URL, or render the default page for
///    bang-less and empty queries
///
/// Resolution never fails: malformed queries degrade to the default page,
/// and directory loading degrades through the fallback chain.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let snapshot = state.directory.snapshot().await;

    match resolve(&query, &snapshot, &state.default_trigger) {
        Resolution::Redirect(url) => {
            debug!("Resolved {:?} -> {}", query, url);
            Redirect::temporary(&url).into_response()
        }
        Resolution::ShowDefault => HomeTemplate {
            public_url: state.public_url.clone(),
        }
        .into_response(),
    }
}
