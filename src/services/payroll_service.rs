//! Domain service wrapping the payroll engine with persistence: previews,
//! upserts keyed by (employee, payout month), and monthly totals.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Month, SalaryRecord};
use crate::payroll::{ComputeError, SalaryBreakdown};

/// Admin-supplied knobs for one payroll row; everything defaults to zero.
#[derive(Debug, Clone, Default)]
pub struct PayrollOverrides {
    pub sales_amount: f64,
    /// Percentage, e.g. 3 for 3%.
    pub bonus_rate: f64,
    pub attendance_bonus: f64,
    pub manual_work_days: Option<f64>,
}

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PayrollError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ComputeError> for PayrollError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::Validation(msg) => Self::Validation(msg),
        }
    }
}

#[async_trait]
pub trait PayrollService: Send + Sync {
    /// Compute the breakdown for a work month without persisting anything.
    async fn preview(
        &self,
        employee_id: &str,
        work_month: Month,
        overrides: PayrollOverrides,
    ) -> Result<SalaryBreakdown, PayrollError>;

    /// Compute and upsert the salary record for the payout month one
    /// calendar month after `work_month`. Currency fields are rounded to
    /// whole units at this point.
    async fn save(
        &self,
        employee_id: &str,
        work_month: Month,
        overrides: PayrollOverrides,
    ) -> Result<SalaryRecord, PayrollError>;

    async fn list(&self) -> Result<Vec<SalaryRecord>, PayrollError>;

    async fn list_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<SalaryRecord>, PayrollError>;

    /// Projected payout for the month: saved rows where they exist, the
    /// status-tier base salary for everyone else.
    async fn monthly_total(&self, work_month: Month) -> Result<f64, PayrollError>;
}
