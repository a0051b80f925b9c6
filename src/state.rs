use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::api::NotificationEvent;
use crate::clients::CloudClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    DefaultEmployeeService, DefaultLeaveService, DefaultPayrollService, EmployeeService,
    LeaveService, PayrollService,
};
use crate::sync::SyncCoordinator;

/// Build a shared HTTP client with reasonable defaults for cloud calls.
/// Reusing one client keeps connection pooling effective.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("NexusHR/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything the API, scheduler, and CLI commands share. Constructed once
/// at startup and passed by `Arc` — there are no module-level singletons.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub cloud: Arc<CloudClient>,

    pub sync: Arc<SyncCoordinator>,

    pub employee_service: Arc<dyn EmployeeService>,

    pub leave_service: Arc<dyn LeaveService>,

    pub payroll_service: Arc<dyn PayrollService>,

    pub event_bus: broadcast::Sender<NotificationEvent>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::init_with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        Self::init_with_event_bus(config, event_bus).await
    }

    async fn init_with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.cloud.request_timeout_seconds)?;
        let cloud_config = crate::clients::CloudConfig {
            base_url: config.cloud.api_url.clone(),
            request_timeout_seconds: config.cloud.request_timeout_seconds,
        };
        let cloud = Arc::new(CloudClient::with_shared_client(&cloud_config, http_client));

        let sync = Arc::new(SyncCoordinator::new(
            store.clone(),
            cloud.clone(),
            event_bus.clone(),
        ));
        sync.notify_initial().await;

        let employee_service = Arc::new(DefaultEmployeeService::new(
            store.clone(),
            sync.clone(),
            config.security.clone(),
        )) as Arc<dyn EmployeeService>;

        let leave_service = Arc::new(DefaultLeaveService::new(
            store.clone(),
            sync.clone(),
            event_bus.clone(),
        )) as Arc<dyn LeaveService>;

        let payroll_service = Arc::new(DefaultPayrollService::new(store.clone(), sync.clone()))
            as Arc<dyn PayrollService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            cloud,
            sync,
            employee_service,
            leave_service,
            payroll_service,
            event_bus,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
