use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{leave_requests, prelude::*};
use crate::models::{LeaveRequest, Versioned};

/// Repository for the local leave_requests table.
pub struct LeaveRepository {
    conn: DatabaseConnection,
}

impl LeaveRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: leave_requests::Model) -> Result<Versioned<LeaveRequest>> {
        let start_date = NaiveDate::parse_from_str(&m.start_date, "%Y-%m-%d")
            .with_context(|| format!("invalid start date for leave {}: {}", m.id, m.start_date))?;
        let end_date = NaiveDate::parse_from_str(&m.end_date, "%Y-%m-%d")
            .with_context(|| format!("invalid end date for leave {}: {}", m.id, m.end_date))?;
        let status = m
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("leave {}", m.id))?;
        let updated_at = DateTime::parse_from_rfc3339(&m.local_updated_at)
            .map_or_else(|_| Utc::now(), |d| d.with_timezone(&Utc));

        Ok(Versioned {
            data: LeaveRequest {
                id: m.id,
                employee_id: m.employee_id,
                employee_name: m.employee_name,
                start_date,
                end_date,
                days: m.days.max(0) as u32,
                reason: m.reason,
                status,
                created_at: m.created_at,
                rejection_reason: m.rejection_reason,
            },
            synced: m.synced,
            version: m.version,
            updated_at,
        })
    }

    fn to_active(record: &Versioned<LeaveRequest>) -> leave_requests::ActiveModel {
        let l = &record.data;
        leave_requests::ActiveModel {
            id: Set(l.id.clone()),
            employee_id: Set(l.employee_id.clone()),
            employee_name: Set(l.employee_name.clone()),
            start_date: Set(l.start_date.format("%Y-%m-%d").to_string()),
            end_date: Set(l.end_date.format("%Y-%m-%d").to_string()),
            days: Set(l.days as i32),
            reason: Set(l.reason.clone()),
            status: Set(l.status.as_str().to_string()),
            created_at: Set(l.created_at),
            rejection_reason: Set(l.rejection_reason.clone()),
            synced: Set(record.synced),
            version: Set(record.version),
            local_updated_at: Set(record.updated_at.to_rfc3339()),
        }
    }

    const fn upsert_conflict() -> [leave_requests::Column; 12] {
        [
            leave_requests::Column::EmployeeId,
            leave_requests::Column::EmployeeName,
            leave_requests::Column::StartDate,
            leave_requests::Column::EndDate,
            leave_requests::Column::Days,
            leave_requests::Column::Reason,
            leave_requests::Column::Status,
            leave_requests::Column::CreatedAt,
            leave_requests::Column::RejectionReason,
            leave_requests::Column::Synced,
            leave_requests::Column::Version,
            leave_requests::Column::LocalUpdatedAt,
        ]
    }

    pub async fn list(&self) -> Result<Vec<Versioned<LeaveRequest>>> {
        let rows = LeaveRequests::find()
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<Versioned<LeaveRequest>>> {
        let rows = LeaveRequests::find()
            .filter(leave_requests::Column::EmployeeId.eq(employee_id))
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Versioned<LeaveRequest>>> {
        let row = LeaveRequests::find_by_id(id).one(&self.conn).await?;
        row.map(Self::map_model).transpose()
    }

    pub async fn put(&self, record: &Versioned<LeaveRequest>) -> Result<()> {
        LeaveRequests::insert(Self::to_active(record))
            .on_conflict(
                OnConflict::column(leave_requests::Column::Id)
                    .update_columns(Self::upsert_conflict())
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let result = LeaveRequests::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn replace_all(&self, records: &[Versioned<LeaveRequest>]) -> Result<()> {
        let txn = self.conn.begin().await?;
        LeaveRequests::delete_many().exec(&txn).await?;
        if !records.is_empty() {
            LeaveRequests::insert_many(records.iter().map(Self::to_active))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    pub async fn mark_synced(&self, id: &str, version: i64) -> Result<()> {
        LeaveRequests::update_many()
            .col_expr(
                leave_requests::Column::Synced,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(leave_requests::Column::Id.eq(id))
            .filter(leave_requests::Column::Version.eq(version))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
