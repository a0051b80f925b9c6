use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};

use crate::api::NotificationEvent;
use crate::config::SchedulerConfig;
use crate::state::SharedState;

/// Background timers: the auto-approval sweep, periodic full refresh, and
/// the connectivity probe that flushes the outbox when the cloud comes
/// back.
pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = run_cycle(&state).await {
                    error!("Scheduled cycle failed: {}", e);
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        info!(
            "Scheduler running (sweep {}s, refresh {}m, probe {}s)",
            self.config.auto_approve_interval_seconds,
            self.config.refresh_interval_minutes,
            self.config.probe_interval_seconds
        );

        let mut sweep_interval = interval(Duration::from_secs(
            self.config.auto_approve_interval_seconds.max(1) as u64,
        ));
        let mut refresh_interval = interval(Duration::from_secs(
            self.config.refresh_interval_minutes.max(1) as u64 * 60,
        ));
        let mut probe_interval = interval(Duration::from_secs(
            self.config.probe_interval_seconds.max(1) as u64,
        ));

        let mut probe = ProbeState::new(&self.config);

        loop {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if let Err(e) = sweep_overdue_leaves(&self.state).await {
                        error!("Auto-approval sweep failed: {}", e);
                    }
                }
                _ = refresh_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if let Err(e) = self.state.sync.refresh_all().await {
                        error!("Scheduled refresh failed: {}", e);
                    }
                }
                _ = probe_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    probe.tick(&self.state).await;
                }
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// One full cycle, used by the `check` command.
    pub async fn run_once(&self) -> Result<()> {
        info!("Running manual cycle...");
        run_cycle(&self.state).await
    }
}

async fn run_cycle(state: &Arc<SharedState>) -> Result<()> {
    sweep_overdue_leaves(state).await?;
    state.sync.refresh_all().await?;
    if state.sync.pending_count().await? > 0 {
        state.sync.flush_pending().await?;
    }
    Ok(())
}

async fn sweep_overdue_leaves(state: &Arc<SharedState>) -> Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    let approved = state
        .leave_service
        .auto_approve_overdue(now)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    if !approved.is_empty() {
        info!("Auto-approved {} overdue leave request(s)", approved.len());
    }
    Ok(())
}

/// Tracks reachability transitions and flush backoff between probe ticks.
struct ProbeState {
    was_online: bool,
    consecutive_failures: u32,
    next_flush_earliest: Instant,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl ProbeState {
    fn new(config: &SchedulerConfig) -> Self {
        Self {
            was_online: false,
            consecutive_failures: 0,
            next_flush_earliest: Instant::now(),
            backoff_base: Duration::from_secs(config.flush_backoff_base_seconds.max(1)),
            backoff_max: Duration::from_secs(config.flush_backoff_max_seconds.max(1)),
        }
    }

    async fn tick(&mut self, state: &Arc<SharedState>) {
        let online = state.sync.is_online().await;

        if online != self.was_online {
            if online {
                info!("Cloud backend reachable again");
            } else {
                warn!("Cloud backend unreachable, operating locally");
            }
            let _ = state
                .event_bus
                .send(NotificationEvent::SyncModeChanged { online });
        }

        if online {
            let came_online = !self.was_online;
            let pending = state.sync.pending_count().await.unwrap_or(0);

            if pending > 0 && (came_online || Instant::now() >= self.next_flush_earliest) {
                match state.sync.flush_pending().await {
                    Ok(stats) if stats.failed == 0 => {
                        self.consecutive_failures = 0;
                        self.next_flush_earliest = Instant::now();
                    }
                    Ok(stats) => {
                        self.apply_backoff();
                        debug!(
                            "Flush left {} item(s) pending, backing off",
                            stats.failed
                        );
                    }
                    Err(e) => {
                        self.apply_backoff();
                        warn!("Flush failed: {}", e);
                    }
                }
            }
        }

        self.was_online = online;
    }

    fn apply_backoff(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let factor = 1u32 << self.consecutive_failures.min(16);
        let delay = self
            .backoff_base
            .saturating_mul(factor)
            .min(self.backoff_max);
        self.next_flush_earliest = Instant::now() + delay;
    }
}
