use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::warn;
use utoipa::ToSchema;

use crate::{errors::ServiceError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether the database answered a ping
    pub database: bool,
    pub version: String,
}

/// Liveness plus database reachability
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let database = match crate::db::check_connection(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, elapsed_ms = start.elapsed().as_millis() as u64, "Health check: database unreachable");
            false
        }
    };

    let (code, status) = if database {
        (StatusCode::OK, HealthStatus::Ok)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Degraded)
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Service identity
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "Service name and version")),
    tag = "Health"
)]
pub async fn api_status(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    Ok(Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
