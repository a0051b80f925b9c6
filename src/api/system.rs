use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_user;
use super::{ApiError, ApiResponse, AppState, SystemStatusDto};

/// Liveness probe, same shape as the cloud backend's.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let database_ok = state.store().ping().await.is_ok();
    Json(serde_json::json!({
        "status": if database_ok { "ok" } else { "degraded" },
    }))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<SystemStatusDto>>, ApiError> {
    current_user(&session).await?;

    let database_ok = state.store().ping().await.is_ok();
    let cloud_online = state.shared.sync.is_online().await;
    let pending_changes = state.shared.sync.pending_count().await.unwrap_or(0);

    Ok(Json(ApiResponse::success(SystemStatusDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database_ok,
        cloud_online,
        pending_changes,
    })))
}
