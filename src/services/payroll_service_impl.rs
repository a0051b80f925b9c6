//! Sync-backed implementation of the `PayrollService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::db::Store;
use crate::models::{Employee, LeaveRequest, Month, SalaryRecord};
use crate::payroll::{self, EmploymentStatus, PayrollInputs, SalaryBreakdown, round_currency};
use crate::services::payroll_service::{PayrollError, PayrollOverrides, PayrollService};
use crate::sync::SyncCoordinator;

pub struct DefaultPayrollService {
    store: Store,
    sync: Arc<SyncCoordinator>,
}

impl DefaultPayrollService {
    #[must_use]
    pub fn new(store: Store, sync: Arc<SyncCoordinator>) -> Self {
        Self { store, sync }
    }

    async fn breakdown(
        &self,
        employee_id: &str,
        work_month: Month,
        overrides: &PayrollOverrides,
    ) -> Result<(Employee, SalaryBreakdown), PayrollError> {
        let employee = self
            .store
            .get_employee(employee_id)
            .await
            .map_err(PayrollError::from)?
            .map(|v| v.data)
            .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))?;

        let leaves: Vec<LeaveRequest> = self
            .store
            .list_leaves_for_employee(employee_id)
            .await
            .map_err(PayrollError::from)?
            .into_iter()
            .map(|v| v.data)
            .collect();

        let breakdown = payroll::compute(&PayrollInputs {
            employee: &employee,
            work_month,
            leaves: &leaves,
            sales_amount: overrides.sales_amount,
            bonus_rate: overrides.bonus_rate,
            attendance_bonus: overrides.attendance_bonus,
            manual_work_days: overrides.manual_work_days,
        })?;

        Ok((employee, breakdown))
    }
}

#[async_trait]
impl PayrollService for DefaultPayrollService {
    async fn preview(
        &self,
        employee_id: &str,
        work_month: Month,
        overrides: PayrollOverrides,
    ) -> Result<SalaryBreakdown, PayrollError> {
        let (_, breakdown) = self.breakdown(employee_id, work_month, &overrides).await?;
        Ok(breakdown)
    }

    async fn save(
        &self,
        employee_id: &str,
        work_month: Month,
        overrides: PayrollOverrides,
    ) -> Result<SalaryRecord, PayrollError> {
        let (employee, breakdown) = self.breakdown(employee_id, work_month, &overrides).await?;

        let payout_month = work_month.next();
        let record = SalaryRecord {
            id: SalaryRecord::compose_id(&employee.id, payout_month),
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            payout_month,
            basic_salary: round_currency(breakdown.basic_salary),
            manual_work_days: overrides.manual_work_days.filter(|d| *d > 0.0),
            standard_salary: round_currency(breakdown.standard_salary),
            leave_deduction: round_currency(breakdown.leave_deduction),
            sales_amount: breakdown.sales_amount,
            bonus_rate: breakdown.bonus_rate,
            bonus_amount: round_currency(breakdown.bonus_amount),
            attendance_bonus: round_currency(breakdown.attendance_bonus),
            total_salary: round_currency(breakdown.total_salary),
            updated_at: Utc::now().timestamp_millis(),
        };

        self.sync
            .save(record.clone())
            .await
            .map_err(PayrollError::from)?;

        info!(
            "Saved payroll for {} ({}): work month {}, total {}",
            record.employee_name, record.employee_id, work_month, record.total_salary
        );
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<SalaryRecord>, PayrollError> {
        self.sync
            .get_all::<SalaryRecord>()
            .await
            .map_err(PayrollError::from)
    }

    async fn list_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<SalaryRecord>, PayrollError> {
        let rows = self
            .store
            .list_salaries_for_employee(employee_id)
            .await
            .map_err(PayrollError::from)?;
        Ok(rows.into_iter().map(|v| v.data).collect())
    }

    async fn monthly_total(&self, work_month: Month) -> Result<f64, PayrollError> {
        let payout_month = work_month.next();
        let employees = self
            .store
            .list_employees()
            .await
            .map_err(PayrollError::from)?;
        let salaries = self.store.list_salaries().await.map_err(PayrollError::from)?;

        let mut total = 0.0;
        for employee in employees {
            let employee = employee.data;
            let record_id = SalaryRecord::compose_id(&employee.id, payout_month);

            if let Some(record) = salaries.iter().find(|r| r.data.id == record_id) {
                total += record.data.total_salary;
                continue;
            }

            // No saved row yet: project the status-tier base salary.
            total += match payroll::employment_status(
                employee.join_date,
                employee.probation_months,
                work_month,
            ) {
                EmploymentStatus::NotJoined => 0.0,
                EmploymentStatus::Probation => employee.probation_salary,
                EmploymentStatus::Official => employee.full_salary,
            };
        }

        Ok(total)
    }
}
