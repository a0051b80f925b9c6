//! The payroll engine: pure, deterministic salary math over an employee,
//! a work month, and their approved leave history.

pub mod calendar;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Employee, LeaveRequest, LeaveStatus, Month};

pub use calendar::{is_working_day, standard_working_days, working_days_between};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    NotJoined,
    Probation,
    Official,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Which salary tier applies for a work month.
///
/// Probation runs from the join month for `probation_months` months; the
/// boundary month itself is already official. Months before the join month
/// are not employment at all.
#[must_use]
pub fn employment_status(
    join_date: NaiveDate,
    probation_months: u32,
    work_month: Month,
) -> EmploymentStatus {
    let join_month = Month::from_date(join_date);
    if work_month.index() < join_month.index() {
        return EmploymentStatus::NotJoined;
    }

    let probation_end = join_month.plus_months(probation_months);
    if work_month.index() < probation_end.index() {
        EmploymentStatus::Probation
    } else {
        EmploymentStatus::Official
    }
}

/// Everything the engine needs for one (employee, work month) computation.
pub struct PayrollInputs<'a> {
    pub employee: &'a Employee,
    pub work_month: Month,
    /// Leave history for this employee; non-approved entries are ignored.
    pub leaves: &'a [LeaveRequest],
    pub sales_amount: f64,
    /// Percentage, e.g. 3 for 3%.
    pub bonus_rate: f64,
    pub attendance_bonus: f64,
    /// Replaces the computed net days entirely when > 0.
    pub manual_work_days: Option<f64>,
}

/// Full salary breakdown, unrounded. Currency fields are rounded to whole
/// units only when persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub status: EmploymentStatus,
    pub standard_days: u32,
    pub potential_days: u32,
    /// 0 when a manual override suppresses deduction reporting.
    pub leave_days: u32,
    pub net_days: f64,
    pub daily_rate: f64,
    pub standard_salary: f64,
    pub basic_salary: f64,
    pub leave_deduction: f64,
    pub sales_amount: f64,
    pub bonus_rate: f64,
    pub bonus_amount: f64,
    pub attendance_bonus: f64,
    pub total_salary: f64,
}

impl SalaryBreakdown {
    fn zero(status: EmploymentStatus, standard_days: u32) -> Self {
        Self {
            status,
            standard_days,
            potential_days: 0,
            leave_days: 0,
            net_days: 0.0,
            daily_rate: 0.0,
            standard_salary: 0.0,
            basic_salary: 0.0,
            leave_deduction: 0.0,
            sales_amount: 0.0,
            bonus_rate: 0.0,
            bonus_amount: 0.0,
            attendance_bonus: 0.0,
            total_salary: 0.0,
        }
    }
}

/// Round a currency amount to the nearest whole unit, as persisted values
/// are.
#[must_use]
pub fn round_currency(amount: f64) -> f64 {
    amount.round()
}

pub fn compute(inputs: &PayrollInputs) -> Result<SalaryBreakdown, ComputeError> {
    validate(inputs)?;

    let employee = inputs.employee;
    let month = inputs.work_month;
    let standard_days = calendar::standard_working_days(month);

    let status = employment_status(employee.join_date, employee.probation_months, month);
    if status == EmploymentStatus::NotJoined {
        return Ok(SalaryBreakdown::zero(status, standard_days));
    }

    let tier_salary = match status {
        EmploymentStatus::Probation => employee.probation_salary,
        _ => employee.full_salary,
    };

    let potential_days = if month.contains(employee.join_date) {
        calendar::working_days_between(employee.join_date, month.last_day())
    } else {
        standard_days
    };

    let leave_days = leave_deducted_days(month, employee, inputs.leaves);

    let manual = inputs.manual_work_days.filter(|d| *d > 0.0);
    let net_days =
        manual.unwrap_or_else(|| f64::from(potential_days.saturating_sub(leave_days)));

    let daily_rate = if standard_days == 0 {
        0.0
    } else {
        tier_salary / f64::from(standard_days)
    };

    let basic_salary = daily_rate * net_days;
    let bonus_amount = inputs.sales_amount * (inputs.bonus_rate / 100.0);
    let total_salary = basic_salary + bonus_amount + inputs.attendance_bonus;

    // An explicit override takes total precedence: the automatic deduction
    // figure is suppressed, not blended.
    let (leave_days, leave_deduction) = if manual.is_some() {
        (0, 0.0)
    } else {
        (leave_days, daily_rate * f64::from(leave_days))
    };

    Ok(SalaryBreakdown {
        status,
        standard_days,
        potential_days,
        leave_days,
        net_days,
        daily_rate,
        standard_salary: tier_salary,
        basic_salary,
        leave_deduction,
        sales_amount: inputs.sales_amount,
        bonus_rate: inputs.bonus_rate,
        bonus_amount,
        attendance_bonus: inputs.attendance_bonus,
        total_salary,
    })
}

/// Working days of the month covered by any approved leave, counted once
/// regardless of overlapping requests.
fn leave_deducted_days(month: Month, employee: &Employee, leaves: &[LeaveRequest]) -> u32 {
    let approved: Vec<&LeaveRequest> = leaves
        .iter()
        .filter(|l| l.employee_id == employee.id && l.status == LeaveStatus::Approved)
        .collect();

    if approved.is_empty() {
        return 0;
    }

    month
        .first_day()
        .iter_days()
        .take_while(|d| *d <= month.last_day())
        .filter(|d| calendar::is_working_day(*d))
        .filter(|d| approved.iter().any(|l| l.covers(*d)))
        .count() as u32
}

fn validate(inputs: &PayrollInputs) -> Result<(), ComputeError> {
    if inputs.sales_amount < 0.0 {
        return Err(ComputeError::Validation(
            "sales amount cannot be negative".to_string(),
        ));
    }
    if inputs.bonus_rate < 0.0 {
        return Err(ComputeError::Validation(
            "bonus rate cannot be negative".to_string(),
        ));
    }
    if inputs.attendance_bonus < 0.0 {
        return Err(ComputeError::Validation(
            "attendance bonus cannot be negative".to_string(),
        ));
    }
    if let Some(days) = inputs.manual_work_days
        && days < 0.0
    {
        return Err(ComputeError::Validation(
            "manual work days cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn employee() -> Employee {
        Employee {
            id: "lr0615".to_string(),
            name: "Li Ru".to_string(),
            job_title: "Sales Manager".to_string(),
            gender: Gender::Female,
            join_date: date(2024, 6, 15),
            probation_salary: 4000.0,
            full_salary: 6000.0,
            probation_months: 3,
            password_hash: String::new(),
            first_login: false,
        }
    }

    fn approved_leave(id: &str, start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        LeaveRequest {
            id: id.to_string(),
            employee_id: "lr0615".to_string(),
            employee_name: "Li Ru".to_string(),
            start_date: start,
            end_date: end,
            days: LeaveRequest::inclusive_days(start, end),
            reason: "personal".to_string(),
            status: LeaveStatus::Approved,
            created_at: 0,
            rejection_reason: None,
        }
    }

    fn inputs<'a>(emp: &'a Employee, work_month: &str, leaves: &'a [LeaveRequest]) -> PayrollInputs<'a> {
        PayrollInputs {
            employee: emp,
            work_month: month(work_month),
            leaves,
            sales_amount: 0.0,
            bonus_rate: 0.0,
            attendance_bonus: 0.0,
            manual_work_days: None,
        }
    }

    #[test]
    fn status_tracks_probation_boundary() {
        let emp = employee();
        assert_eq!(
            employment_status(emp.join_date, emp.probation_months, month("2024-05")),
            EmploymentStatus::NotJoined
        );
        assert_eq!(
            employment_status(emp.join_date, emp.probation_months, month("2024-06")),
            EmploymentStatus::Probation
        );
        assert_eq!(
            employment_status(emp.join_date, emp.probation_months, month("2024-08")),
            EmploymentStatus::Probation
        );
        // Join + 3 months: the boundary month itself pays the full tier.
        assert_eq!(
            employment_status(emp.join_date, emp.probation_months, month("2024-09")),
            EmploymentStatus::Official
        );
    }

    #[test]
    fn not_joined_pays_zero() {
        let emp = employee();
        let breakdown = compute(&inputs(&emp, "2024-05", &[])).unwrap();
        assert_eq!(breakdown.status, EmploymentStatus::NotJoined);
        assert_eq!(breakdown.total_salary, 0.0);
        assert_eq!(breakdown.basic_salary, 0.0);
        assert_eq!(breakdown.net_days, 0.0);
    }

    #[test]
    fn probation_month_uses_probation_tier() {
        let emp = employee();
        let breakdown = compute(&inputs(&emp, "2024-06", &[])).unwrap();
        assert_eq!(breakdown.status, EmploymentStatus::Probation);
        assert_eq!(breakdown.standard_salary, 4000.0);
        let standard = f64::from(breakdown.standard_days);
        assert!((breakdown.daily_rate - 4000.0 / standard).abs() < 1e-9);
    }

    #[test]
    fn official_month_uses_full_tier() {
        let emp = employee();
        let breakdown = compute(&inputs(&emp, "2024-09", &[])).unwrap();
        assert_eq!(breakdown.status, EmploymentStatus::Official);
        assert_eq!(breakdown.standard_salary, 6000.0);
        let standard = f64::from(breakdown.standard_days);
        assert!((breakdown.daily_rate - 6000.0 / standard).abs() < 1e-9);
    }

    #[test]
    fn mid_month_join_prorates_potential_days() {
        let emp = employee();
        let breakdown = compute(&inputs(&emp, "2024-06", &[])).unwrap();
        // June 2024 from the 15th: the 15th itself is a resting Saturday.
        assert_eq!(
            breakdown.potential_days,
            working_days_between(date(2024, 6, 15), date(2024, 6, 30))
        );
        assert!(breakdown.potential_days < breakdown.standard_days);
        assert_eq!(breakdown.net_days, f64::from(breakdown.potential_days));
    }

    #[test]
    fn weekday_leave_deducts_exactly_its_working_days() {
        let emp = employee();
        // 2024-07-10..12 are Wed/Thu/Fri, no Saturday overlap.
        let leaves = vec![approved_leave("LR-1", date(2024, 7, 10), date(2024, 7, 12))];
        let with_leave = compute(&inputs(&emp, "2024-07", &leaves)).unwrap();
        let without = compute(&inputs(&emp, "2024-07", &[])).unwrap();

        assert_eq!(with_leave.leave_days, 3);
        assert_eq!(with_leave.net_days, without.net_days - 3.0);
        assert!(
            (with_leave.leave_deduction - with_leave.daily_rate * 3.0).abs() < 1e-9
        );
    }

    #[test]
    fn overlapping_leaves_count_days_once() {
        let emp = employee();
        let leaves = vec![
            approved_leave("LR-1", date(2024, 7, 10), date(2024, 7, 12)),
            approved_leave("LR-2", date(2024, 7, 11), date(2024, 7, 15)),
        ];
        let breakdown = compute(&inputs(&emp, "2024-07", &leaves)).unwrap();
        // Union of 10..=15 July: 10,11,12 (Wed-Fri), 13 (2nd Saturday, working)
        // and 15 (Mon); the 14th is a Sunday.
        assert_eq!(breakdown.leave_days, 5);
    }

    #[test]
    fn pending_and_rejected_leaves_do_not_deduct() {
        let emp = employee();
        let mut pending = approved_leave("LR-1", date(2024, 7, 10), date(2024, 7, 12));
        pending.status = LeaveStatus::Pending;
        let mut rejected = approved_leave("LR-2", date(2024, 7, 15), date(2024, 7, 16));
        rejected.status = LeaveStatus::Rejected;

        let breakdown = compute(&inputs(&emp, "2024-07", &[pending, rejected])).unwrap();
        assert_eq!(breakdown.leave_days, 0);
    }

    #[test]
    fn leave_clips_to_the_work_month() {
        let emp = employee();
        // Spans the July/August boundary; only July working days deduct here.
        let leaves = vec![approved_leave("LR-1", date(2024, 7, 30), date(2024, 8, 2))];
        let breakdown = compute(&inputs(&emp, "2024-07", &leaves)).unwrap();
        // 30th (Tue) and 31st (Wed).
        assert_eq!(breakdown.leave_days, 2);
    }

    #[test]
    fn manual_override_replaces_net_days_and_suppresses_deduction() {
        let emp = employee();
        let leaves = vec![approved_leave("LR-1", date(2024, 7, 10), date(2024, 7, 12))];
        let mut input = inputs(&emp, "2024-07", &leaves);
        input.manual_work_days = Some(10.0);

        let breakdown = compute(&input).unwrap();
        assert_eq!(breakdown.net_days, 10.0);
        assert_eq!(breakdown.leave_days, 0);
        assert_eq!(breakdown.leave_deduction, 0.0);
        assert!((breakdown.basic_salary - breakdown.daily_rate * 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_manual_override_is_ignored() {
        let emp = employee();
        let mut input = inputs(&emp, "2024-07", &[]);
        input.manual_work_days = Some(0.0);

        let breakdown = compute(&input).unwrap();
        assert_eq!(breakdown.net_days, f64::from(breakdown.potential_days));
    }

    #[test]
    fn bonus_and_attendance_add_onto_base() {
        let emp = employee();
        let mut input = inputs(&emp, "2024-09", &[]);
        input.sales_amount = 10_000.0;
        input.bonus_rate = 3.0;
        input.attendance_bonus = 100.0;

        let breakdown = compute(&input).unwrap();
        assert!((breakdown.bonus_amount - 300.0).abs() < 1e-9);
        assert!(
            (breakdown.total_salary - (breakdown.basic_salary + 300.0 + 100.0)).abs() < 1e-9
        );
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let emp = employee();

        let mut input = inputs(&emp, "2024-09", &[]);
        input.sales_amount = -1.0;
        assert!(matches!(compute(&input), Err(ComputeError::Validation(_))));

        let mut input = inputs(&emp, "2024-09", &[]);
        input.bonus_rate = -0.5;
        assert!(matches!(compute(&input), Err(ComputeError::Validation(_))));

        let mut input = inputs(&emp, "2024-09", &[]);
        input.attendance_bonus = -10.0;
        assert!(matches!(compute(&input), Err(ComputeError::Validation(_))));

        let mut input = inputs(&emp, "2024-09", &[]);
        input.manual_work_days = Some(-2.0);
        assert!(matches!(compute(&input), Err(ComputeError::Validation(_))));
    }

    #[test]
    fn computation_is_deterministic() {
        let emp = employee();
        let leaves = vec![approved_leave("LR-1", date(2024, 7, 10), date(2024, 7, 12))];
        let mut input = inputs(&emp, "2024-07", &leaves);
        input.sales_amount = 5000.0;
        input.bonus_rate = 2.0;

        let first = compute(&input).unwrap();
        let second = compute(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn net_days_never_go_negative() {
        let emp = employee();
        // Leave covering the whole month, joined mid-month: deducted days for
        // the full month exceed the pro-rated potential.
        let leaves = vec![approved_leave("LR-1", date(2024, 6, 1), date(2024, 6, 30))];
        let breakdown = compute(&inputs(&emp, "2024-06", &leaves)).unwrap();
        assert_eq!(breakdown.net_days, 0.0);
        assert_eq!(breakdown.basic_salary, 0.0);
    }

    #[test]
    fn rounding_is_to_whole_units() {
        assert_eq!(round_currency(4363.63), 4364.0);
        assert_eq!(round_currency(4363.49), 4363.0);
        assert_eq!(round_currency(0.5), 1.0);
    }
}
