use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin};
use super::{ApiError, ApiResponse, AppState, LeaveDecisionRequest, SubmitLeaveRequest};
use crate::models::LeaveRequest;
use crate::services::NewLeave;

/// Admins see every request; employees see their own.
pub async fn list_leaves(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<LeaveRequest>>>, ApiError> {
    let user = current_user(&session).await?;

    let leaves = if user.is_admin() {
        state.shared.leave_service.list().await?
    } else {
        state
            .shared
            .leave_service
            .list_for_employee(&user.id)
            .await?
    };

    Ok(Json(ApiResponse::success(leaves)))
}

pub async fn submit_leave(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<SubmitLeaveRequest>,
) -> Result<Json<ApiResponse<LeaveRequest>>, ApiError> {
    let user = current_user(&session).await?;
    if user.is_admin() {
        return Err(ApiError::validation(
            "leave requests are submitted by employees",
        ));
    }

    let leave = state
        .shared
        .leave_service
        .submit(
            &user.id,
            NewLeave {
                start_date: request.start_date,
                end_date: request.end_date,
                reason: request.reason,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(leave)))
}

pub async fn edit_leave(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<SubmitLeaveRequest>,
) -> Result<Json<ApiResponse<LeaveRequest>>, ApiError> {
    let user = current_user(&session).await?;

    let leave = state
        .shared
        .leave_service
        .edit(
            &id,
            &user.id,
            NewLeave {
                start_date: request.start_date,
                end_date: request.end_date,
                reason: request.reason,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(leave)))
}

pub async fn decide_leave(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<LeaveDecisionRequest>,
) -> Result<Json<ApiResponse<LeaveRequest>>, ApiError> {
    require_admin(&session).await?;

    let leave = state
        .shared
        .leave_service
        .set_status(&id, request.status, request.reason)
        .await?;

    Ok(Json(ApiResponse::success(leave)))
}
