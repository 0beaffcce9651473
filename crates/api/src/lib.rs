//! Fatigue Monitor API Server
//!
//! REST server over the detection loop: event feed, counters, and
//! start/stop control for the fatigue engine.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use detection_scheduler::DetectionLoop;
use landmark_capture::ReplaySource;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod error;
mod routes;
pub mod settings;

pub use error::ApiError;
pub use settings::{LoggingSettings, Settings};

/// Application state shared across handlers
pub struct AppState {
    /// Detection loop driving the fatigue engine
    pub detection: DetectionLoop,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(detection: DetectionLoop, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            detection,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics,
        }
    }
}

pub type SharedState = Arc<RwLock<AppState>>;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub detection_running: bool,
    pub ticks: u64,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/events", get(routes::events::get_events))
        .route("/api/v1/counters", get(routes::events::get_counters))
        .route("/api/v1/counters/reset", post(routes::events::reset_counters))
        .route("/api/v1/detection/start", post(routes::detection::start))
        .route("/api/v1/detection/stop", post(routes::detection::stop))
        .route("/api/v1/detection/status", get(routes::detection::status))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        detection_running: state.detection.is_running(),
        ticks: state.detection.tick_count().await,
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging. `RUST_LOG` overrides the configured level.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}

/// Run the server until Ctrl-C, then stop detection
pub async fn run_server(settings: Settings, metrics: Option<PrometheusHandle>) -> anyhow::Result<()> {
    let source = ReplaySource::new(&settings.source.replay_path, settings.source.looped);
    let mut detection = DetectionLoop::new(settings.detection.clone(), Box::new(source))?;

    if settings.source.autostart {
        detection.start().await?;
    }

    let state = Arc::new(RwLock::new(AppState::new(detection, metrics)));
    let app = create_router(Arc::clone(&state)).layer(TraceLayer::new_for_http());

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.write().await.detection.stop().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
