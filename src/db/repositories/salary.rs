use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{prelude::*, salary_records};
use crate::models::{SalaryRecord, Versioned};

/// Repository for the local salary_records table.
pub struct SalaryRepository {
    conn: DatabaseConnection,
}

impl SalaryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: salary_records::Model) -> Result<Versioned<SalaryRecord>> {
        let payout_month = m
            .payout_month
            .parse()
            .with_context(|| format!("invalid payout month for salary {}: {}", m.id, m.payout_month))?;
        let updated_at = DateTime::parse_from_rfc3339(&m.local_updated_at)
            .map_or_else(|_| Utc::now(), |d| d.with_timezone(&Utc));

        Ok(Versioned {
            data: SalaryRecord {
                id: m.id,
                employee_id: m.employee_id,
                employee_name: m.employee_name,
                payout_month,
                basic_salary: m.basic_salary,
                manual_work_days: m.manual_work_days,
                standard_salary: m.standard_salary,
                leave_deduction: m.leave_deduction,
                sales_amount: m.sales_amount,
                bonus_rate: m.bonus_rate,
                bonus_amount: m.bonus_amount,
                attendance_bonus: m.attendance_bonus,
                total_salary: m.total_salary,
                updated_at: m.updated_at,
            },
            synced: m.synced,
            version: m.version,
            updated_at,
        })
    }

    fn to_active(record: &Versioned<SalaryRecord>) -> salary_records::ActiveModel {
        let s = &record.data;
        salary_records::ActiveModel {
            id: Set(s.id.clone()),
            employee_id: Set(s.employee_id.clone()),
            employee_name: Set(s.employee_name.clone()),
            payout_month: Set(s.payout_month.to_string()),
            basic_salary: Set(s.basic_salary),
            manual_work_days: Set(s.manual_work_days),
            standard_salary: Set(s.standard_salary),
            leave_deduction: Set(s.leave_deduction),
            sales_amount: Set(s.sales_amount),
            bonus_rate: Set(s.bonus_rate),
            bonus_amount: Set(s.bonus_amount),
            attendance_bonus: Set(s.attendance_bonus),
            total_salary: Set(s.total_salary),
            updated_at: Set(s.updated_at),
            synced: Set(record.synced),
            version: Set(record.version),
            local_updated_at: Set(record.updated_at.to_rfc3339()),
        }
    }

    const fn upsert_conflict() -> [salary_records::Column; 16] {
        [
            salary_records::Column::EmployeeId,
            salary_records::Column::EmployeeName,
            salary_records::Column::PayoutMonth,
            salary_records::Column::BasicSalary,
            salary_records::Column::ManualWorkDays,
            salary_records::Column::StandardSalary,
            salary_records::Column::LeaveDeduction,
            salary_records::Column::SalesAmount,
            salary_records::Column::BonusRate,
            salary_records::Column::BonusAmount,
            salary_records::Column::AttendanceBonus,
            salary_records::Column::TotalSalary,
            salary_records::Column::UpdatedAt,
            salary_records::Column::Synced,
            salary_records::Column::Version,
            salary_records::Column::LocalUpdatedAt,
        ]
    }

    pub async fn list(&self) -> Result<Vec<Versioned<SalaryRecord>>> {
        let rows = SalaryRecords::find()
            .order_by_desc(salary_records::Column::PayoutMonth)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn list_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Versioned<SalaryRecord>>> {
        let rows = SalaryRecords::find()
            .filter(salary_records::Column::EmployeeId.eq(employee_id))
            .order_by_desc(salary_records::Column::PayoutMonth)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Versioned<SalaryRecord>>> {
        let row = SalaryRecords::find_by_id(id).one(&self.conn).await?;
        row.map(Self::map_model).transpose()
    }

    pub async fn put(&self, record: &Versioned<SalaryRecord>) -> Result<()> {
        SalaryRecords::insert(Self::to_active(record))
            .on_conflict(
                OnConflict::column(salary_records::Column::Id)
                    .update_columns(Self::upsert_conflict())
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let result = SalaryRecords::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn replace_all(&self, records: &[Versioned<SalaryRecord>]) -> Result<()> {
        let txn = self.conn.begin().await?;
        SalaryRecords::delete_many().exec(&txn).await?;
        if !records.is_empty() {
            SalaryRecords::insert_many(records.iter().map(Self::to_active))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    pub async fn mark_synced(&self, id: &str, version: i64) -> Result<()> {
        SalaryRecords::update_many()
            .col_expr(
                salary_records::Column::Synced,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(salary_records::Column::Id.eq(id))
            .filter(salary_records::Column::Version.eq(version))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
