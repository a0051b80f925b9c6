use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::{
    Collection, Employee, LeaveRequest, OutboxEntry, OutboxOp, SalaryRecord, SyncEntity, Versioned,
};

pub mod migrator;
pub mod repositories;

/// Facade over the local SQLite tables; migrations are applied at connect.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn employee_repo(&self) -> repositories::employee::EmployeeRepository {
        repositories::employee::EmployeeRepository::new(self.conn.clone())
    }

    fn leave_repo(&self) -> repositories::leave::LeaveRepository {
        repositories::leave::LeaveRepository::new(self.conn.clone())
    }

    fn salary_repo(&self) -> repositories::salary::SalaryRepository {
        repositories::salary::SalaryRepository::new(self.conn.clone())
    }

    fn outbox_repo(&self) -> repositories::outbox::OutboxRepository {
        repositories::outbox::OutboxRepository::new(self.conn.clone())
    }

    // Domain-specific queries the generic table seam does not cover.

    pub async fn get_employee(&self, id: &str) -> Result<Option<Versioned<Employee>>> {
        self.employee_repo().get(id).await
    }

    pub async fn list_employees(&self) -> Result<Vec<Versioned<Employee>>> {
        self.employee_repo().list().await
    }

    pub async fn list_leaves(&self) -> Result<Vec<Versioned<LeaveRequest>>> {
        self.leave_repo().list().await
    }

    pub async fn list_leaves_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Versioned<LeaveRequest>>> {
        self.leave_repo().list_for_employee(employee_id).await
    }

    pub async fn get_leave(&self, id: &str) -> Result<Option<Versioned<LeaveRequest>>> {
        self.leave_repo().get(id).await
    }

    pub async fn list_salaries(&self) -> Result<Vec<Versioned<SalaryRecord>>> {
        self.salary_repo().list().await
    }

    pub async fn list_salaries_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Versioned<SalaryRecord>>> {
        self.salary_repo().list_for_employee(employee_id).await
    }

    pub async fn get_salary(&self, id: &str) -> Result<Option<Versioned<SalaryRecord>>> {
        self.salary_repo().get(id).await
    }

    // Outbox.

    pub async fn outbox_append(
        &self,
        collection: Collection,
        record_id: &str,
        op: OutboxOp,
        payload: Option<&serde_json::Value>,
        version: i64,
    ) -> Result<i64> {
        self.outbox_repo()
            .append(collection, record_id, op, payload, version)
            .await
    }

    pub async fn outbox_pending(&self) -> Result<Vec<OutboxEntry>> {
        self.outbox_repo().pending().await
    }

    pub async fn outbox_pending_count(&self) -> Result<u64> {
        self.outbox_repo().pending_count().await
    }

    pub async fn outbox_mark_synced(&self, id: i64) -> Result<()> {
        self.outbox_repo().mark_synced(id).await
    }

    pub async fn outbox_mark_attempt_failed(
        &self,
        id: i64,
        attempts: i32,
        error: &str,
    ) -> Result<()> {
        self.outbox_repo()
            .mark_attempt_failed(id, attempts, error)
            .await
    }

    pub async fn outbox_supersede_older(
        &self,
        collection: Collection,
        record_id: &str,
        version: i64,
    ) -> Result<u64> {
        self.outbox_repo()
            .supersede_older(collection, record_id, version)
            .await
    }
}

/// The per-entity seam the sync layer is generic over; one impl per synced
/// collection.
#[async_trait]
pub trait LocalTable<E: SyncEntity> {
    async fn list_versioned(&self) -> Result<Vec<Versioned<E>>>;
    async fn get_versioned(&self, id: &str) -> Result<Option<Versioned<E>>>;
    async fn put_versioned(&self, record: &Versioned<E>) -> Result<()>;
    async fn remove_local(&self, id: &str) -> Result<bool>;
    async fn replace_all(&self, records: &[Versioned<E>]) -> Result<()>;
    async fn mark_record_synced(&self, id: &str, version: i64) -> Result<()>;
}

#[async_trait]
impl LocalTable<Employee> for Store {
    async fn list_versioned(&self) -> Result<Vec<Versioned<Employee>>> {
        self.employee_repo().list().await
    }

    async fn get_versioned(&self, id: &str) -> Result<Option<Versioned<Employee>>> {
        self.employee_repo().get(id).await
    }

    async fn put_versioned(&self, record: &Versioned<Employee>) -> Result<()> {
        self.employee_repo().put(record).await
    }

    async fn remove_local(&self, id: &str) -> Result<bool> {
        self.employee_repo().remove(id).await
    }

    async fn replace_all(&self, records: &[Versioned<Employee>]) -> Result<()> {
        self.employee_repo().replace_all(records).await
    }

    async fn mark_record_synced(&self, id: &str, version: i64) -> Result<()> {
        self.employee_repo().mark_synced(id, version).await
    }
}

#[async_trait]
impl LocalTable<LeaveRequest> for Store {
    async fn list_versioned(&self) -> Result<Vec<Versioned<LeaveRequest>>> {
        self.leave_repo().list().await
    }

    async fn get_versioned(&self, id: &str) -> Result<Option<Versioned<LeaveRequest>>> {
        self.leave_repo().get(id).await
    }

    async fn put_versioned(&self, record: &Versioned<LeaveRequest>) -> Result<()> {
        self.leave_repo().put(record).await
    }

    async fn remove_local(&self, id: &str) -> Result<bool> {
        self.leave_repo().remove(id).await
    }

    async fn replace_all(&self, records: &[Versioned<LeaveRequest>]) -> Result<()> {
        self.leave_repo().replace_all(records).await
    }

    async fn mark_record_synced(&self, id: &str, version: i64) -> Result<()> {
        self.leave_repo().mark_synced(id, version).await
    }
}

#[async_trait]
impl LocalTable<SalaryRecord> for Store {
    async fn list_versioned(&self) -> Result<Vec<Versioned<SalaryRecord>>> {
        self.salary_repo().list().await
    }

    async fn get_versioned(&self, id: &str) -> Result<Option<Versioned<SalaryRecord>>> {
        self.salary_repo().get(id).await
    }

    async fn put_versioned(&self, record: &Versioned<SalaryRecord>) -> Result<()> {
        self.salary_repo().put(record).await
    }

    async fn remove_local(&self, id: &str) -> Result<bool> {
        self.salary_repo().remove(id).await
    }

    async fn replace_all(&self, records: &[Versioned<SalaryRecord>]) -> Result<()> {
        self.salary_repo().replace_all(records).await
    }

    async fn mark_record_synced(&self, id: &str, version: i64) -> Result<()> {
        self.salary_repo().mark_synced(id, version).await
    }
}
