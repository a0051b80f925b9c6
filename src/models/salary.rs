use serde::{Deserialize, Serialize};

use crate::models::month::Month;
use crate::models::sync::{Collection, SyncEntity};

/// A persisted payroll row, keyed `{employee_id}_{payout_month}`.
///
/// The payout month is one calendar month after the work month being paid
/// for; attendance math always runs on the derived work month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    /// `YYYY-MM` payout month ("month" on the wire, as the backend expects).
    #[serde(rename = "month")]
    pub payout_month: Month,
    /// Earned base pay for the period, pro-rated by attendance.
    pub basic_salary: f64,
    /// Admin override of net working days; replaces the computed figure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_work_days: Option<f64>,
    /// Full-period tier salary before any deduction.
    pub standard_salary: f64,
    pub leave_deduction: f64,
    pub sales_amount: f64,
    /// Percentage, e.g. 3 for 3%.
    pub bonus_rate: f64,
    pub bonus_amount: f64,
    pub attendance_bonus: f64,
    pub total_salary: f64,
    /// Epoch milliseconds of the last save.
    pub updated_at: i64,
}

impl SalaryRecord {
    #[must_use]
    pub fn compose_id(employee_id: &str, payout_month: Month) -> String {
        format!("{employee_id}_{payout_month}")
    }

    /// The month this row actually compensates.
    #[must_use]
    pub fn work_month(&self) -> Month {
        self.payout_month.prev()
    }
}

impl SyncEntity for SalaryRecord {
    const COLLECTION: Collection = Collection::Salaries;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_id_shape() {
        let month: Month = "2024-07".parse().unwrap();
        assert_eq!(SalaryRecord::compose_id("lr0615", month), "lr0615_2024-07");
    }

    #[test]
    fn work_month_is_previous_calendar_month() {
        let record = SalaryRecord {
            id: "lr0615_2025-01".to_string(),
            employee_id: "lr0615".to_string(),
            employee_name: "Li Ru".to_string(),
            payout_month: "2025-01".parse().unwrap(),
            basic_salary: 6000.0,
            manual_work_days: None,
            standard_salary: 6000.0,
            leave_deduction: 0.0,
            sales_amount: 0.0,
            bonus_rate: 0.0,
            bonus_amount: 0.0,
            attendance_bonus: 0.0,
            total_salary: 6000.0,
            updated_at: 0,
        };
        assert_eq!(record.work_month().to_string(), "2024-12");
    }

    #[test]
    fn wire_shape_keeps_the_backend_field_name() {
        let record = SalaryRecord {
            id: "lr0615_2024-08".to_string(),
            employee_id: "lr0615".to_string(),
            employee_name: "Li Ru".to_string(),
            payout_month: "2024-08".parse().unwrap(),
            basic_salary: 4000.0,
            manual_work_days: Some(20.0),
            standard_salary: 4000.0,
            leave_deduction: 0.0,
            sales_amount: 10_000.0,
            bonus_rate: 3.0,
            bonus_amount: 300.0,
            attendance_bonus: 100.0,
            total_salary: 4400.0,
            updated_at: 1,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["month"], "2024-08");
        assert_eq!(json["manualWorkDays"], 20.0);
        assert_eq!(json["totalSalary"], 4400.0);
    }
}
