use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::constants::auth::SESSION_IDLE_MINUTES;
use crate::state::SharedState;

pub mod auth;
mod employees;
mod error;
pub mod events;
mod leaves;
mod observability;
mod salaries;
mod sync;
mod system;
mod types;

pub use error::ApiError;
pub use events::NotificationEvent;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<NotificationEvent> {
        &self.shared.event_bus
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_IDLE_MINUTES,
        )));

    let api_router = Router::new()
        .merge(protected_router())
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let health_router = Router::new()
        .route("/health", get(system::health))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .merge(health_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/password", post(auth::change_password))
        .route("/me", get(employees::me))
        .route("/employees", get(employees::list_employees))
        .route("/employees", post(employees::create_employee))
        .route("/employees/{id}", put(employees::update_employee))
        .route("/employees/{id}", delete(employees::remove_employee))
        .route(
            "/employees/{id}/reset-password",
            post(employees::reset_password),
        )
        .route("/leaves", get(leaves::list_leaves))
        .route("/leaves", post(leaves::submit_leave))
        .route("/leaves/{id}", put(leaves::edit_leave))
        .route("/leaves/{id}/status", post(leaves::decide_leave))
        .route("/salaries", get(salaries::list_salaries))
        .route("/salaries", post(salaries::save_salary))
        .route("/salaries/preview", get(salaries::preview_salary))
        .route("/salaries/total", get(salaries::monthly_total))
        .route("/sync/status", get(sync::sync_status))
        .route("/sync/flush", post(sync::flush_pending))
        .route("/system/status", get(system::status))
        .route("/system/metrics", get(observability::get_metrics))
        .merge(events::router())
}
