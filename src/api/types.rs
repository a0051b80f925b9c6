use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Employee, Gender, LeaveStatus, Month};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Employee as served to the browser — everything but the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: String,
    pub name: String,
    pub job_title: String,
    pub gender: Gender,
    pub join_date: NaiveDate,
    pub probation_salary: f64,
    pub full_salary: f64,
    pub probation_months: u32,
    pub first_login: bool,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            name: e.name,
            job_title: e.job_title,
            gender: e.gender,
            join_date: e.join_date,
            probation_salary: e.probation_salary,
            full_salary: e.full_salary,
            probation_months: e.probation_months,
            first_login: e.first_login,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub job_title: String,
    pub gender: Gender,
    pub join_date: NaiveDate,
    pub probation_salary: f64,
    pub full_salary: f64,
    #[serde(default = "default_probation_months")]
    pub probation_months: u32,
}

const fn default_probation_months() -> u32 {
    3
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    pub must_change_password: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDecisionRequest {
    pub status: LeaveStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSalaryRequest {
    pub employee_id: String,
    /// The month being compensated; the payout lands one month later.
    pub work_month: Month,
    #[serde(default)]
    pub sales_amount: f64,
    #[serde(default)]
    pub bonus_rate: f64,
    #[serde(default)]
    pub attendance_bonus: f64,
    #[serde(default)]
    pub manual_work_days: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPreviewQuery {
    pub employee_id: String,
    pub work_month: Month,
    #[serde(default)]
    pub sales_amount: f64,
    #[serde(default)]
    pub bonus_rate: f64,
    #[serde(default)]
    pub attendance_bonus: f64,
    #[serde(default)]
    pub manual_work_days: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotalQuery {
    pub work_month: Month,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotalDto {
    pub work_month: Month,
    pub payout_month: Month,
    /// Disbursement date within the payout month.
    pub pay_date: Option<NaiveDate>,
    pub total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusDto {
    pub online: bool,
    pub pending: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushResultDto {
    pub attempted: usize,
    pub flushed: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatusDto {
    pub version: String,
    pub uptime_seconds: u64,
    pub database_ok: bool,
    pub cloud_online: bool,
    pub pending_changes: u64,
}
