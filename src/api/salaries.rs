use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin};
use super::{
    ApiError, ApiResponse, AppState, MonthlyTotalDto, MonthlyTotalQuery, SalaryPreviewQuery,
    SaveSalaryRequest,
};
use crate::models::SalaryRecord;
use crate::payroll::SalaryBreakdown;
use crate::services::PayrollOverrides;

pub async fn list_salaries(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<SalaryRecord>>>, ApiError> {
    let user = current_user(&session).await?;

    let salaries = if user.is_admin() {
        state.shared.payroll_service.list().await?
    } else {
        state
            .shared
            .payroll_service
            .list_for_employee(&user.id)
            .await?
    };

    Ok(Json(ApiResponse::success(salaries)))
}

/// Run the engine without saving, for the settlement screen.
pub async fn preview_salary(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<SalaryPreviewQuery>,
) -> Result<Json<ApiResponse<SalaryBreakdown>>, ApiError> {
    require_admin(&session).await?;

    let breakdown = state
        .shared
        .payroll_service
        .preview(
            &query.employee_id,
            query.work_month,
            PayrollOverrides {
                sales_amount: query.sales_amount,
                bonus_rate: query.bonus_rate,
                attendance_bonus: query.attendance_bonus,
                manual_work_days: query.manual_work_days,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(breakdown)))
}

pub async fn save_salary(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<SaveSalaryRequest>,
) -> Result<Json<ApiResponse<SalaryRecord>>, ApiError> {
    require_admin(&session).await?;

    let record = state
        .shared
        .payroll_service
        .save(
            &request.employee_id,
            request.work_month,
            PayrollOverrides {
                sales_amount: request.sales_amount,
                bonus_rate: request.bonus_rate,
                attendance_bonus: request.attendance_bonus,
                manual_work_days: request.manual_work_days,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(record)))
}

pub async fn monthly_total(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<MonthlyTotalQuery>,
) -> Result<Json<ApiResponse<MonthlyTotalDto>>, ApiError> {
    require_admin(&session).await?;

    let total = state
        .shared
        .payroll_service
        .monthly_total(query.work_month)
        .await?;

    let payout_month = query.work_month.next();
    let pay_date = chrono::NaiveDate::from_ymd_opt(
        payout_month.year(),
        payout_month.month(),
        crate::constants::payroll::PAY_DAY_OF_MONTH,
    );

    Ok(Json(ApiResponse::success(MonthlyTotalDto {
        work_month: query.work_month,
        payout_month,
        pay_date,
        total,
    })))
}
