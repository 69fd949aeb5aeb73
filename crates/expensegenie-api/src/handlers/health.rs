//! Health Check Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Unix milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready` or `not_ready`
    pub status: String,
    pub database: ComponentStatus,
    /// Names of the configured AI providers, in the order they are tried
    pub ai_providers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentStatus {
    pub name: String,
    /// healthy/unhealthy
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness; does not touch dependencies
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Readiness; 503 while the database is unreachable
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service is not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match state.db.health_check().await {
        Ok(health) if health.healthy => ComponentStatus {
            name: health.backend.to_string(),
            status: "healthy".to_string(),
            error: None,
        },
        Ok(health) => ComponentStatus {
            name: health.backend.to_string(),
            status: "unhealthy".to_string(),
            error: Some("Database health check failed".to_string()),
        },
        Err(e) => ComponentStatus {
            name: state.db.backend().to_string(),
            status: "unhealthy".to_string(),
            error: Some(e.to_string()),
        },
    };

    let ready = database.error.is_none();
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            database,
            ai_providers: state
                .advisor
                .router()
                .kinds()
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }),
    )
}
