//! Health probes
//!
//! `/health` and `/health/live` never touch storage. `/health/detailed` and
//! `/health/ready` ping SQLite; the detailed probe also reports cache usage.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{db::migrations, services::CacheStats, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: Status,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: Status,
    pub version: &'static str,
    pub components: Components,
}

#[derive(Serialize)]
pub struct Components {
    pub database: DatabaseHealth,
    pub cache: CacheHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    pub status: Status,
    /// Round trip of the ping query
    pub latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct CacheHealth {
    pub enabled: bool,
    #[serde(flatten)]
    pub stats: CacheStats,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

async fn ping(state: &AppState) -> DatabaseHealth {
    let started = Instant::now();
    let result = migrations::check_connection(&state.db).await;
    let latency_ms = started.elapsed().as_millis();
    match result {
        Ok(()) => DatabaseHealth {
            status: Status::Healthy,
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!("Database health check failed: {:#}", e);
            DatabaseHealth {
                status: Status::Unhealthy,
                latency_ms,
                error: Some(e.to_string()),
            }
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: Status::Healthy,
        version: VERSION,
    })
}

/// Component health; 503 when the database does not answer
pub async fn health_check_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let database = ping(&state).await;
    let status = database.status;
    let cache = CacheHealth {
        enabled: state.cache.is_enabled(),
        stats: state.cache.stats().await,
    };

    let code = match status {
        Status::Healthy => StatusCode::OK,
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = DetailedHealthResponse {
        status,
        version: VERSION,
        components: Components { database, cache },
    };
    (code, Json(body))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match ping(&state).await.status {
        Status::Healthy => StatusCode::OK,
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}
