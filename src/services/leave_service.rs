//! Domain service for leave requests: submission, edits while pending,
//! admin decisions, and the auto-approval sweep.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{LeaveRequest, LeaveStatus};

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("Leave request not found: {0}")]
    NotFound(String),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for LeaveError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait]
pub trait LeaveService: Send + Sync {
    async fn submit(&self, employee_id: &str, leave: NewLeave)
    -> Result<LeaveRequest, LeaveError>;

    /// Owners may rework a request while it is still pending; doing so
    /// restarts the auto-approval clock.
    async fn edit(
        &self,
        id: &str,
        employee_id: &str,
        leave: NewLeave,
    ) -> Result<LeaveRequest, LeaveError>;

    /// Admin decision. A rejection records the supplied reason (or a stock
    /// one); approval clears any previous rejection reason.
    async fn set_status(
        &self,
        id: &str,
        status: LeaveStatus,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError>;

    async fn list(&self) -> Result<Vec<LeaveRequest>, LeaveError>;

    async fn list_for_employee(&self, employee_id: &str)
    -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Approve every request pending longer than the dwell threshold.
    /// Returns the ids that flipped.
    async fn auto_approve_overdue(&self, now_millis: i64) -> Result<Vec<String>, LeaveError>;
}
