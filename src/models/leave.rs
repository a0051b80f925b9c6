use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::sync::{Collection, SyncEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown leave status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    /// Denormalized so the approval list renders without a join.
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub reason: String,
    pub status: LeaveStatus,
    /// Epoch milliseconds; the auto-approval dwell clock starts here.
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl LeaveRequest {
    /// Inclusive calendar-day count; 0 when the range is inverted.
    #[must_use]
    pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
        if end < start {
            0
        } else {
            (end - start).num_days() as u32 + 1
        }
    }

    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Pending longer than `dwell_ms` — due for auto-approval.
    #[must_use]
    pub fn is_overdue(&self, now_millis: i64, dwell_ms: i64) -> bool {
        self.status == LeaveStatus::Pending && now_millis - self.created_at > dwell_ms
    }
}

impl SyncEntity for LeaveRequest {
    const COLLECTION: Collection = Collection::Leaves;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(status: LeaveStatus, created_at: i64) -> LeaveRequest {
        LeaveRequest {
            id: "LR-test".to_string(),
            employee_id: "lr0615".to_string(),
            employee_name: "Li Ru".to_string(),
            start_date: date(2024, 7, 10),
            end_date: date(2024, 7, 12),
            days: 3,
            reason: "family".to_string(),
            status,
            created_at,
            rejection_reason: None,
        }
    }

    #[test]
    fn inclusive_day_count() {
        assert_eq!(
            LeaveRequest::inclusive_days(date(2024, 7, 10), date(2024, 7, 12)),
            3
        );
        assert_eq!(
            LeaveRequest::inclusive_days(date(2024, 7, 10), date(2024, 7, 10)),
            1
        );
        assert_eq!(
            LeaveRequest::inclusive_days(date(2024, 7, 12), date(2024, 7, 10)),
            0
        );
    }

    #[test]
    fn overdue_only_past_the_dwell() {
        let six_hours = 6 * 60 * 60 * 1000;
        let created = 1_000_000;
        let req = request(LeaveStatus::Pending, created);

        assert!(!req.is_overdue(created + six_hours, six_hours));
        assert!(req.is_overdue(created + six_hours + 1, six_hours));
    }

    #[test]
    fn approved_requests_never_overdue() {
        let req = request(LeaveStatus::Approved, 0);
        assert!(!req.is_overdue(i64::MAX, 1));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<LeaveStatus>().unwrap(), status);
        }
    }
}
