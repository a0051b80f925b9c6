//! Sync-backed implementation of the `LeaveService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::api::NotificationEvent;
use crate::constants::leave::{AUTO_APPROVE_DWELL_MS, DEFAULT_REJECTION_REASON};
use crate::db::Store;
use crate::models::{LeaveRequest, LeaveStatus};
use crate::services::leave_service::{LeaveError, LeaveService, NewLeave};
use crate::sync::SyncCoordinator;

pub struct DefaultLeaveService {
    store: Store,
    sync: Arc<SyncCoordinator>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl DefaultLeaveService {
    #[must_use]
    pub fn new(
        store: Store,
        sync: Arc<SyncCoordinator>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            sync,
            event_bus,
        }
    }

    fn validated_days(leave: &NewLeave) -> Result<u32, LeaveError> {
        let days = LeaveRequest::inclusive_days(leave.start_date, leave.end_date);
        if days == 0 {
            return Err(LeaveError::Validation(
                "end date must not precede start date".to_string(),
            ));
        }
        Ok(days)
    }

    async fn fetch(&self, id: &str) -> Result<LeaveRequest, LeaveError> {
        self.store
            .get_leave(id)
            .await
            .map_err(LeaveError::from)?
            .map(|v| v.data)
            .ok_or_else(|| LeaveError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl LeaveService for DefaultLeaveService {
    async fn submit(
        &self,
        employee_id: &str,
        leave: NewLeave,
    ) -> Result<LeaveRequest, LeaveError> {
        let days = Self::validated_days(&leave)?;

        let employee = self
            .store
            .get_employee(employee_id)
            .await
            .map_err(LeaveError::from)?
            .map(|v| v.data)
            .ok_or_else(|| LeaveError::EmployeeNotFound(employee_id.to_string()))?;

        let request = LeaveRequest {
            id: format!("LR-{}", Uuid::new_v4().simple()),
            employee_id: employee.id,
            employee_name: employee.name,
            start_date: leave.start_date,
            end_date: leave.end_date,
            days,
            reason: leave.reason,
            status: LeaveStatus::Pending,
            created_at: Utc::now().timestamp_millis(),
            rejection_reason: None,
        };

        self.sync
            .save(request.clone())
            .await
            .map_err(LeaveError::from)?;
        Ok(request)
    }

    async fn edit(
        &self,
        id: &str,
        employee_id: &str,
        leave: NewLeave,
    ) -> Result<LeaveRequest, LeaveError> {
        let days = Self::validated_days(&leave)?;

        let mut request = self.fetch(id).await?;
        if request.employee_id != employee_id {
            return Err(LeaveError::Forbidden(
                "only the requesting employee may edit this request".to_string(),
            ));
        }
        if request.status != LeaveStatus::Pending {
            return Err(LeaveError::Validation(
                "only pending requests can be edited".to_string(),
            ));
        }

        request.start_date = leave.start_date;
        request.end_date = leave.end_date;
        request.days = days;
        request.reason = leave.reason;
        // Editing restarts the auto-approval clock.
        request.created_at = Utc::now().timestamp_millis();

        self.sync
            .save(request.clone())
            .await
            .map_err(LeaveError::from)?;
        Ok(request)
    }

    async fn set_status(
        &self,
        id: &str,
        status: LeaveStatus,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        if status == LeaveStatus::Pending {
            return Err(LeaveError::Validation(
                "a decision cannot return a request to pending".to_string(),
            ));
        }

        let mut request = self.fetch(id).await?;
        request.status = status;
        request.rejection_reason = if status == LeaveStatus::Rejected {
            Some(reason.unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string()))
        } else {
            None
        };

        self.sync
            .save(request.clone())
            .await
            .map_err(LeaveError::from)?;
        Ok(request)
    }

    async fn list(&self) -> Result<Vec<LeaveRequest>, LeaveError> {
        self.sync
            .get_all::<LeaveRequest>()
            .await
            .map_err(LeaveError::from)
    }

    async fn list_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        let rows = self
            .store
            .list_leaves_for_employee(employee_id)
            .await
            .map_err(LeaveError::from)?;
        Ok(rows.into_iter().map(|v| v.data).collect())
    }

    async fn auto_approve_overdue(&self, now_millis: i64) -> Result<Vec<String>, LeaveError> {
        let rows = self.store.list_leaves().await.map_err(LeaveError::from)?;

        let mut approved = Vec::new();
        for row in rows {
            let mut request = row.data;
            if !request.is_overdue(now_millis, AUTO_APPROVE_DWELL_MS) {
                continue;
            }

            request.status = LeaveStatus::Approved;
            self.sync
                .save(request.clone())
                .await
                .map_err(LeaveError::from)?;

            info!("Auto-approved overdue leave request {}", request.id);
            let _ = self.event_bus.send(NotificationEvent::LeaveAutoApproved {
                id: request.id.clone(),
                employee_name: request.employee_name.clone(),
            });
            approved.push(request.id);
        }

        Ok(approved)
    }
}
