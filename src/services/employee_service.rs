//! Domain service for the employee lifecycle: hiring, edits, password
//! management, login checks, and cascade deletion.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Employee, Gender};

/// Fields the admin supplies when hiring; everything else is derived.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub job_title: String,
    pub gender: Gender,
    pub join_date: NaiveDate,
    pub probation_salary: f64,
    pub full_salary: f64,
    pub probation_months: u32,
}

/// Editable subset of an employee record; identity and credentials are
/// managed through dedicated operations.
#[derive(Debug, Clone)]
pub struct EmployeeUpdate {
    pub name: String,
    pub job_title: String,
    pub gender: Gender,
    pub join_date: NaiveDate,
    pub probation_salary: f64,
    pub full_salary: f64,
    pub probation_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Employee,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// First login still pending its forced password change.
    pub must_change_password: bool,
}

#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("Employee not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for EmployeeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait]
pub trait EmployeeService: Send + Sync {
    /// Hire: generates the stable id, hashes the default password, and
    /// writes through the sync layer.
    async fn create(&self, new: NewEmployee) -> Result<Employee, EmployeeError>;

    async fn update(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, EmployeeError>;

    /// Removes the employee and their leave requests. Salary history is
    /// retained on purpose for historical reporting.
    async fn delete(&self, id: &str) -> Result<(), EmployeeError>;

    async fn list(&self) -> Result<Vec<Employee>, EmployeeError>;

    async fn get(&self, id: &str) -> Result<Employee, EmployeeError>;

    /// Back to the default password with a forced change on next login.
    async fn reset_password(&self, id: &str) -> Result<(), EmployeeError>;

    async fn change_password(&self, id: &str, new_password: &str) -> Result<(), EmployeeError>;

    async fn login(&self, login_id: &str, password: &str) -> Result<LoginOutcome, EmployeeError>;
}
