use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{employees, prelude::*};
use crate::models::{Employee, Gender, Versioned};

/// Repository for the local employees table.
pub struct EmployeeRepository {
    conn: DatabaseConnection,
}

impl EmployeeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: employees::Model) -> Result<Versioned<Employee>> {
        let join_date = NaiveDate::parse_from_str(&m.join_date, "%Y-%m-%d")
            .with_context(|| format!("invalid join date for employee {}: {}", m.id, m.join_date))?;
        let updated_at = DateTime::parse_from_rfc3339(&m.local_updated_at)
            .map_or_else(|_| Utc::now(), |d| d.with_timezone(&Utc));

        Ok(Versioned {
            data: Employee {
                id: m.id,
                name: m.name,
                job_title: m.job_title,
                gender: Gender::parse(&m.gender),
                join_date,
                probation_salary: m.probation_salary,
                full_salary: m.full_salary,
                probation_months: m.probation_months.max(0) as u32,
                password_hash: m.password_hash,
                first_login: m.first_login,
            },
            synced: m.synced,
            version: m.version,
            updated_at,
        })
    }

    fn to_active(record: &Versioned<Employee>) -> employees::ActiveModel {
        let e = &record.data;
        employees::ActiveModel {
            id: Set(e.id.clone()),
            name: Set(e.name.clone()),
            job_title: Set(e.job_title.clone()),
            gender: Set(e.gender.as_str().to_string()),
            join_date: Set(e.join_date.format("%Y-%m-%d").to_string()),
            probation_salary: Set(e.probation_salary),
            full_salary: Set(e.full_salary),
            probation_months: Set(e.probation_months as i32),
            password_hash: Set(e.password_hash.clone()),
            first_login: Set(e.first_login),
            synced: Set(record.synced),
            version: Set(record.version),
            local_updated_at: Set(record.updated_at.to_rfc3339()),
        }
    }

    const fn upsert_conflict() -> [employees::Column; 12] {
        [
            employees::Column::Name,
            employees::Column::JobTitle,
            employees::Column::Gender,
            employees::Column::JoinDate,
            employees::Column::ProbationSalary,
            employees::Column::FullSalary,
            employees::Column::ProbationMonths,
            employees::Column::PasswordHash,
            employees::Column::FirstLogin,
            employees::Column::Synced,
            employees::Column::Version,
            employees::Column::LocalUpdatedAt,
        ]
    }

    pub async fn list(&self) -> Result<Vec<Versioned<Employee>>> {
        let rows = Employees::find()
            .order_by_asc(employees::Column::JoinDate)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Versioned<Employee>>> {
        let row = Employees::find_by_id(id).one(&self.conn).await?;
        row.map(Self::map_model).transpose()
    }

    pub async fn put(&self, record: &Versioned<Employee>) -> Result<()> {
        Employees::insert(Self::to_active(record))
            .on_conflict(
                OnConflict::column(employees::Column::Id)
                    .update_columns(Self::upsert_conflict())
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let result = Employees::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Replace the whole table with a freshly fetched cloud snapshot.
    pub async fn replace_all(&self, records: &[Versioned<Employee>]) -> Result<()> {
        let txn = self.conn.begin().await?;
        Employees::delete_many().exec(&txn).await?;
        if !records.is_empty() {
            Employees::insert_many(records.iter().map(Self::to_active))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Flip the synced flag, but only while the row is still at `version`.
    pub async fn mark_synced(&self, id: &str, version: i64) -> Result<()> {
        Employees::update_many()
            .col_expr(
                employees::Column::Synced,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(employees::Column::Id.eq(id))
            .filter(employees::Column::Version.eq(version))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
