//! Drowsiness Monitor API Server
//!
//! HTTP surface for the monitoring session: the frame/classifier source
//! posts samples, the presentation layer polls status.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use monitor::{ClassifierError, MonitorError, ScoreLayout, SessionHandle};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

mod routes;
pub mod settings;

pub use settings::{ServerSettings, Settings};

/// Application state shared across handlers
pub struct AppState {
    /// Running monitoring session
    pub session: SessionHandle,
    /// Layout of raw classifier scores
    pub score_layout: ScoreLayout,
    /// Prometheus render handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        session: SessionHandle,
        score_layout: ScoreLayout,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            session,
            score_layout,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

pub type SharedState = Arc<RwLock<AppState>>;

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Monitor(MonitorError::SessionClosed) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Monitor(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Classifier(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    pub session_id: Uuid,
    pub session_open: bool,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/api/v1/samples", post(routes::samples::post_samples))
        .route("/api/v1/frames", post(routes::samples::post_frame))
        .route("/api/v1/session/reset", post(routes::session::reset_session))
        .route("/metrics", get(metrics_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    let session_open = !state.session.is_closed();

    Json(HealthResponse {
        status: if session_open { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        session_id: state.session.snapshot().session_id,
        session_open,
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Run the server
pub async fn run_server(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = create_router(Arc::new(RwLock::new(state)));

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
