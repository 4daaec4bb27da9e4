//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Directory**: Reports the published snapshot's entry count and age
///    (never loads; a not-yet-loaded directory is healthy, load happens on
///    demand)
/// 2. **Edge cache**: Backing store reachability
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let directory_check = check_directory(&state).await;
    let edge_check = check_edge_cache(&state).await;

    let all_healthy = directory_check.status == "ok" && edge_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            directory: directory_check,
            edge_cache: edge_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_directory(state: &AppState) -> CheckStatus {
    match state.directory.current().await {
        Some(snapshot) => {
            let age = Utc::now() - snapshot.stamp().timestamp;
            CheckStatus {
                status: "ok".to_string(),
                message: Some(format!(
                    "{} entries, {}s old",
                    snapshot.len(),
                    age.num_seconds().max(0)
                )),
            }
        }
        None => CheckStatus {
            status: "ok".to_string(),
            message: Some("not loaded yet".to_string()),
        },
    }
}

async fn check_edge_cache(state: &AppState) -> CheckStatus {
    if state.edge.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some("store reachable".to_string()),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("store unreachable".to_string()),
        }
    }
}
