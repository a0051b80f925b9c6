use anyhow::{Result, bail};
use reqwest::Client;
use std::time::Duration;

use crate::models::{Collection, SyncEntity};

#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub base_url: String,

    pub request_timeout_seconds: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

/// Thin client for the cloud collection endpoints.
///
/// Every method reports failure as a plain error; the sync layer decides
/// what degrading to local-only means.
#[derive(Clone)]
pub struct CloudClient {
    base_url: String,
    client: Client,
}

impl CloudClient {
    pub fn new(config: &CloudConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("NexusHR/1.0")
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Reuse a shared pooled client, same base URL handling.
    pub fn with_shared_client(config: &CloudConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/api/{}", self.base_url, collection.as_str())
    }

    /// Liveness probe; any transport or non-2xx outcome counts as down.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn fetch_all<E: SyncEntity>(&self) -> Result<Vec<E>> {
        let url = self.collection_url(E::COLLECTION);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            bail!("cloud API error: {} on GET {}", response.status(), url);
        }

        Ok(response.json().await?)
    }

    pub async fn upsert<E: SyncEntity>(&self, record: &E) -> Result<()> {
        self.upsert_raw(E::COLLECTION, &serde_json::to_value(record)?)
            .await
    }

    /// Upsert from a pre-serialized body, used when replaying outbox entries.
    pub async fn upsert_raw(
        &self,
        collection: Collection,
        payload: &serde_json::Value,
    ) -> Result<()> {
        let url = self.collection_url(collection);
        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            bail!("cloud API error: {} on POST {}", response.status(), url);
        }

        Ok(())
    }

    pub async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let url = self.collection_url(collection);
        let response = self
            .client
            .delete(&url)
            .query(&[("id", id)])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("cloud API error: {} on DELETE {}", response.status(), url);
        }

        Ok(())
    }
}
