use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin};
use super::{ApiError, ApiResponse, AppState, CreateEmployeeRequest, EmployeeDto};
use crate::services::{EmployeeUpdate, NewEmployee};

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<EmployeeDto>>>, ApiError> {
    require_admin(&session).await?;

    let employees = state.shared.employee_service.list().await?;
    Ok(Json(ApiResponse::success(
        employees.into_iter().map(EmployeeDto::from).collect(),
    )))
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    require_admin(&session).await?;

    let employee = state
        .shared
        .employee_service
        .create(NewEmployee {
            name: request.name,
            job_title: request.job_title,
            gender: request.gender,
            join_date: request.join_date,
            probation_salary: request.probation_salary,
            full_salary: request.full_salary,
            probation_months: request.probation_months,
        })
        .await?;

    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    require_admin(&session).await?;

    let employee = state
        .shared
        .employee_service
        .update(
            &id,
            EmployeeUpdate {
                name: request.name,
                job_title: request.job_title,
                gender: request.gender,
                join_date: request.join_date,
                probation_salary: request.probation_salary,
                full_salary: request.full_salary,
                probation_months: request.probation_months,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

pub async fn remove_employee(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&session).await?;

    state.shared.employee_service.delete(&id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&session).await?;

    state.shared.employee_service.reset_password(&id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// The caller's own profile.
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let user = current_user(&session).await?;
    if user.is_admin() {
        return Err(ApiError::NotFound(
            "the administrator has no employee profile".to_string(),
        ));
    }

    let employee = state.shared.employee_service.get(&user.id).await?;
    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}
