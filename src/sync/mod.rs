//! Offline-first reconciliation between the local store and the cloud API.
//!
//! Reads prefer the cloud and fall back to the local tables; writes land
//! locally first and are replayed through a durable outbox. Callers never
//! see a cloud failure — the only visible symptom is the pending count
//! broadcast on the event bus.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::NotificationEvent;
use crate::clients::CloudClient;
use crate::db::{LocalTable, Store};
use crate::models::{
    Collection, Employee, LeaveRequest, OutboxOp, SalaryRecord, SyncEntity, Versioned,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct FlushStats {
    pub attempted: usize,
    pub flushed: usize,
    pub failed: usize,
}

/// One coordinator per process, built in `SharedState` and injected.
pub struct SyncCoordinator {
    store: Store,
    cloud: Arc<CloudClient>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SyncCoordinator {
    pub fn new(
        store: Store,
        cloud: Arc<CloudClient>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            cloud,
            event_bus,
        }
    }

    /// Cloud-authoritative read: a successful fetch overwrites the local
    /// table; any failure serves the local table unfiltered.
    pub async fn get_all<E>(&self) -> Result<Vec<E>>
    where
        E: SyncEntity,
        Store: LocalTable<E>,
    {
        match self.cloud.fetch_all::<E>().await {
            Ok(records) => {
                let wrapped: Vec<Versioned<E>> = records
                    .iter()
                    .cloned()
                    .map(Versioned::from_remote)
                    .collect();
                LocalTable::<E>::replace_all(&self.store, &wrapped).await?;

                metrics::counter!("sync_pull_total", "collection" => E::COLLECTION.as_str())
                    .increment(1);
                Ok(records)
            }
            Err(e) => {
                debug!(
                    "Cloud fetch for {} failed, serving local table: {e}",
                    E::COLLECTION
                );
                metrics::counter!("sync_fallback_total", "collection" => E::COLLECTION.as_str())
                    .increment(1);

                let local = LocalTable::<E>::list_versioned(&self.store).await?;
                Ok(local.into_iter().map(|v| v.data).collect())
            }
        }
    }

    /// Optimistic write: local first, one push attempt, queued on failure.
    pub async fn save<E>(&self, record: E) -> Result<()>
    where
        E: SyncEntity,
        Store: LocalTable<E>,
    {
        let id = record.record_id();
        let version = LocalTable::<E>::get_versioned(&self.store, &id)
            .await?
            .map_or(1, |existing| existing.version + 1);

        let wrapped = Versioned::local(record.clone(), version);
        LocalTable::<E>::put_versioned(&self.store, &wrapped).await?;

        let payload = serde_json::to_value(&record)?;
        let entry_id = self
            .store
            .outbox_append(E::COLLECTION, &id, OutboxOp::Upsert, Some(&payload), version)
            .await?;
        self.store
            .outbox_supersede_older(E::COLLECTION, &id, version)
            .await?;

        match self.cloud.upsert(&record).await {
            Ok(()) => {
                LocalTable::<E>::mark_record_synced(&self.store, &id, version).await?;
                self.store.outbox_mark_synced(entry_id).await?;
                metrics::counter!("sync_push_total", "collection" => E::COLLECTION.as_str())
                    .increment(1);
            }
            Err(e) => {
                debug!(
                    "Cloud upsert for {}/{id} failed, queued for retry: {e}",
                    E::COLLECTION
                );
                metrics::counter!("sync_queued_total", "collection" => E::COLLECTION.as_str())
                    .increment(1);
            }
        }

        self.broadcast_pending().await;
        Ok(())
    }

    /// Local removal wins: never rolled back, cloud delete is best-effort.
    pub async fn delete<E>(&self, id: &str) -> Result<bool>
    where
        E: SyncEntity,
        Store: LocalTable<E>,
    {
        let version = LocalTable::<E>::get_versioned(&self.store, id)
            .await?
            .map_or(1, |existing| existing.version + 1);

        let removed = LocalTable::<E>::remove_local(&self.store, id).await?;

        let entry_id = self
            .store
            .outbox_append(E::COLLECTION, id, OutboxOp::Delete, None, version)
            .await?;
        self.store
            .outbox_supersede_older(E::COLLECTION, id, version)
            .await?;

        match self.cloud.delete(E::COLLECTION, id).await {
            Ok(()) => {
                self.store.outbox_mark_synced(entry_id).await?;
            }
            Err(e) => {
                debug!(
                    "Cloud delete for {}/{id} failed, queued for retry: {e}",
                    E::COLLECTION
                );
            }
        }

        self.broadcast_pending().await;
        Ok(removed)
    }

    pub async fn pending_count(&self) -> Result<u64> {
        self.store.outbox_pending_count().await
    }

    /// Replay pending outbox entries oldest first. One entry failing never
    /// aborts the batch.
    pub async fn flush_pending(&self) -> Result<FlushStats> {
        let entries = self.store.outbox_pending().await?;
        let mut stats = FlushStats {
            attempted: entries.len(),
            ..FlushStats::default()
        };

        for entry in entries {
            let result = match entry.op {
                OutboxOp::Upsert => match &entry.payload {
                    Some(payload) => self.cloud.upsert_raw(entry.collection, payload).await,
                    None => Err(anyhow!("upsert entry {} has no payload", entry.id)),
                },
                OutboxOp::Delete => self.cloud.delete(entry.collection, &entry.record_id).await,
            };

            match result {
                Ok(()) => {
                    self.store.outbox_mark_synced(entry.id).await?;
                    if entry.op == OutboxOp::Upsert {
                        self.mark_local_synced(entry.collection, &entry.record_id, entry.version)
                            .await?;
                    }
                    stats.flushed += 1;
                }
                Err(e) => {
                    debug!(
                        "Replay of outbox entry {} ({}/{}) failed: {e}",
                        entry.id, entry.collection, entry.record_id
                    );
                    self.store
                        .outbox_mark_attempt_failed(entry.id, entry.attempts + 1, &e.to_string())
                        .await?;
                    stats.failed += 1;
                }
            }
        }

        if stats.attempted > 0 {
            info!(
                "Outbox flush: {}/{} replayed, {} still pending",
                stats.flushed, stats.attempted, stats.failed
            );
            let _ = self.event_bus.send(NotificationEvent::FlushFinished {
                flushed: stats.flushed,
                failed: stats.failed,
            });
        }

        self.broadcast_pending().await;
        Ok(stats)
    }

    /// Startup refresh: all collections concurrently, no ordering between
    /// entity types. Cloud failures degrade per collection, so the only
    /// errors surfacing here are local-store ones.
    pub async fn refresh_all(&self) -> Result<()> {
        let (employees, leaves, salaries) = tokio::join!(
            self.get_all::<Employee>(),
            self.get_all::<LeaveRequest>(),
            self.get_all::<SalaryRecord>()
        );
        employees?;
        leaves?;
        salaries?;
        Ok(())
    }

    pub async fn is_online(&self) -> bool {
        self.cloud.health().await
    }

    /// Fire the initial pending-count notification subscribers expect.
    pub async fn notify_initial(&self) {
        self.broadcast_pending().await;
    }

    async fn mark_local_synced(
        &self,
        collection: Collection,
        record_id: &str,
        version: i64,
    ) -> Result<()> {
        match collection {
            Collection::Employees => {
                LocalTable::<Employee>::mark_record_synced(&self.store, record_id, version).await
            }
            Collection::Leaves => {
                LocalTable::<LeaveRequest>::mark_record_synced(&self.store, record_id, version)
                    .await
            }
            Collection::Salaries => {
                LocalTable::<SalaryRecord>::mark_record_synced(&self.store, record_id, version)
                    .await
            }
        }
    }

    async fn broadcast_pending(&self) {
        match self.pending_count().await {
            Ok(count) => {
                metrics::gauge!("sync_pending_records").set(count as f64);
                let _ = self
                    .event_bus
                    .send(NotificationEvent::PendingChanged { count });
            }
            Err(e) => warn!("Failed to compute pending count: {e}"),
        }
    }
}
