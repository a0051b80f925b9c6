use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, sync_outbox};
use crate::models::{Collection, OutboxEntry, OutboxOp, OutboxStatus};

/// Repository for the durable queue of pending cloud mutations.
pub struct OutboxRepository {
    conn: DatabaseConnection,
}

impl OutboxRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: sync_outbox::Model) -> Result<OutboxEntry> {
        let collection: Collection = m
            .collection
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("outbox entry {}", m.id))?;
        let op: OutboxOp = m
            .op
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("outbox entry {}", m.id))?;
        let status: OutboxStatus = m
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("outbox entry {}", m.id))?;
        let payload = m
            .payload
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .with_context(|| format!("outbox entry {} payload", m.id))?;
        let created_at = DateTime::parse_from_rfc3339(&m.created_at)
            .map_or_else(|_| Utc::now(), |d| d.with_timezone(&Utc));

        Ok(OutboxEntry {
            id: i64::from(m.id),
            collection,
            record_id: m.record_id,
            op,
            payload,
            version: m.version,
            status,
            attempts: m.attempts,
            last_error: m.last_error,
            created_at,
        })
    }

    /// Append a new pending entry; returns its id.
    pub async fn append(
        &self,
        collection: Collection,
        record_id: &str,
        op: OutboxOp,
        payload: Option<&serde_json::Value>,
        version: i64,
    ) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        let active = sync_outbox::ActiveModel {
            collection: Set(collection.as_str().to_string()),
            record_id: Set(record_id.to_string()),
            op: Set(op.as_str().to_string()),
            payload: Set(payload.map(serde_json::Value::to_string)),
            version: Set(version),
            status: Set(OutboxStatus::Pending.as_str().to_string()),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let res = SyncOutbox::insert(active).exec(&self.conn).await?;
        Ok(i64::from(res.last_insert_id))
    }

    /// Pending entries, oldest first, ready for replay.
    pub async fn pending(&self) -> Result<Vec<OutboxEntry>> {
        let rows = SyncOutbox::find()
            .filter(sync_outbox::Column::Status.eq(OutboxStatus::Pending.as_str()))
            .order_by_asc(sync_outbox::Column::Id)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn pending_count(&self) -> Result<u64> {
        let count = SyncOutbox::find()
            .filter(sync_outbox::Column::Status.eq(OutboxStatus::Pending.as_str()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn mark_synced(&self, id: i64) -> Result<()> {
        self.set_status(id, OutboxStatus::Synced, None).await
    }

    /// Record a failed replay attempt without giving up on the entry.
    pub async fn mark_attempt_failed(&self, id: i64, attempts: i32, error: &str) -> Result<()> {
        SyncOutbox::update_many()
            .col_expr(
                sync_outbox::Column::Attempts,
                sea_orm::sea_query::Expr::value(attempts),
            )
            .col_expr(
                sync_outbox::Column::LastError,
                sea_orm::sea_query::Expr::value(error),
            )
            .col_expr(
                sync_outbox::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now().to_rfc3339()),
            )
            .filter(sync_outbox::Column::Id.eq(id as i32))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Retire pending entries for `record_id` older than `version`; a newer
    /// local write has made them stale.
    pub async fn supersede_older(
        &self,
        collection: Collection,
        record_id: &str,
        version: i64,
    ) -> Result<u64> {
        let result = SyncOutbox::update_many()
            .col_expr(
                sync_outbox::Column::Status,
                sea_orm::sea_query::Expr::value(OutboxStatus::Superseded.as_str()),
            )
            .col_expr(
                sync_outbox::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now().to_rfc3339()),
            )
            .filter(sync_outbox::Column::Collection.eq(collection.as_str()))
            .filter(sync_outbox::Column::RecordId.eq(record_id))
            .filter(sync_outbox::Column::Status.eq(OutboxStatus::Pending.as_str()))
            .filter(sync_outbox::Column::Version.lt(version))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn set_status(
        &self,
        id: i64,
        status: OutboxStatus,
        error: Option<&str>,
    ) -> Result<()> {
        SyncOutbox::update_many()
            .col_expr(
                sync_outbox::Column::Status,
                sea_orm::sea_query::Expr::value(status.as_str()),
            )
            .col_expr(
                sync_outbox::Column::LastError,
                sea_orm::sea_query::Expr::value(error),
            )
            .col_expr(
                sync_outbox::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now().to_rfc3339()),
            )
            .filter(sync_outbox::Column::Id.eq(id as i32))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
