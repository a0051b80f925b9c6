use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

/// The three logical tables kept in sync with the cloud backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Employees,
    Leaves,
    Salaries,
}

impl Collection {
    pub const ALL: [Self; 3] = [Self::Employees, Self::Leaves, Self::Salaries];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Leaves => "leaves",
            Self::Salaries => "salaries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employees" => Ok(Self::Employees),
            "leaves" => Ok(Self::Leaves),
            "salaries" => Ok(Self::Salaries),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}

/// A record the sync layer knows how to push to and pull from the cloud.
pub trait SyncEntity:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const COLLECTION: Collection;

    fn record_id(&self) -> String;
}

/// Composition envelope around every locally stored record.
///
/// `version` is bumped on each local save; an outbox entry carrying an older
/// version than the latest for the same record is superseded, never replayed.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub synced: bool,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl<T> Versioned<T> {
    /// Wrap a record fetched from the cloud: already in sync, version baseline.
    pub fn from_remote(data: T) -> Self {
        Self {
            data,
            synced: true,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Wrap a locally written record awaiting push.
    pub fn local(data: T, version: i64) -> Self {
        Self {
            data,
            synced: false,
            version,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxOp {
    Upsert,
    Delete,
}

impl OutboxOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upsert => "upsert",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for OutboxOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upsert" => Ok(Self::Upsert),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown outbox op: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    Synced,
    Failed,
    Superseded,
}

impl OutboxStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
            Self::Superseded => "superseded",
        }
    }
}

impl FromStr for OutboxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "synced" => Ok(Self::Synced),
            "failed" => Ok(Self::Failed),
            "superseded" => Ok(Self::Superseded),
            other => Err(format!("unknown outbox status: {other}")),
        }
    }
}

/// One durable pending mutation awaiting replay against the cloud.
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub id: i64,
    pub collection: Collection,
    pub record_id: String,
    pub op: OutboxOp,
    /// JSON body for upserts; `None` for deletes.
    pub payload: Option<serde_json::Value>,
    pub version: i64,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}
