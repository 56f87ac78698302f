//! 健康检查与指标导出

use axum::extract::State;
use axum::Json;
use mes_adapter_postgres::{check_connection, pool_status};
use mes_telemetry::HealthStatus;
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(flatten)]
    pub detail: HealthStatus,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut detail = HealthStatus::new();

    match check_connection(&state.pool).await {
        Ok(()) => {
            let pool = pool_status(&state.pool);
            detail.add_check(
                "database",
                true,
                Some(format!("pool active={} idle={}", pool.active, pool.idle)),
            );
        }
        Err(e) => detail.add_check("database", false, Some(e.to_string())),
    }

    let status = if detail.healthy { "healthy" } else { "unhealthy" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        detail,
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
