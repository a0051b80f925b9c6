use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_user;
use super::{ApiError, ApiResponse, AppState, FlushResultDto, SyncStatusDto};

pub async fn sync_status(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<SyncStatusDto>>, ApiError> {
    current_user(&session).await?;

    let online = state.shared.sync.is_online().await;
    let pending = state.shared.sync.pending_count().await?;

    Ok(Json(ApiResponse::success(SyncStatusDto { online, pending })))
}

/// Manual "flush pending" — replay the outbox right now.
pub async fn flush_pending(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<FlushResultDto>>, ApiError> {
    current_user(&session).await?;

    let stats = state.shared.sync.flush_pending().await?;

    Ok(Json(ApiResponse::success(FlushResultDto {
        attempted: stats.attempted,
        flushed: stats.flushed,
        failed: stats.failed,
    })))
}
