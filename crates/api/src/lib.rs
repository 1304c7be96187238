//! Report API Server
//!
//! REST surface consumed by dashboard collaborators: per-subject reports,
//! roster headcounts, and the recent alert feed.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use monitor::MonitorHub;
use reporting::ReportEngine;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod routes;

/// Application state shared across handlers
pub struct AppState {
    /// Read side over the persisted daily records
    pub engine: ReportEngine,
    /// Live monitoring hub (roster, aggregator, alert feed)
    pub hub: Arc<Mutex<MonitorHub>>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state over an existing hub.
    pub fn new(engine: ReportEngine, hub: Arc<Mutex<MonitorHub>>) -> Self {
        Self {
            engine,
            hub,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: SystemMetrics,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub subjects: usize,
    pub subjects_with_data_today: usize,
    pub recent_alerts: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/reports/daily", get(routes::reports::get_daily))
        .route("/api/v1/reports/weekly", get(routes::reports::get_weekly))
        .route("/api/v1/reports/monthly", get(routes::reports::get_monthly))
        .route(
            "/api/v1/reports/comparison",
            get(routes::reports::get_comparison),
        )
        .route("/api/v1/roster/stats", get(routes::roster::get_stats))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let metrics = match state.hub.lock() {
        Ok(hub) => SystemMetrics {
            subjects: hub.roster().len(),
            subjects_with_data_today: hub.aggregator().subject_count(),
            recent_alerts: hub.alert_log().len(),
        },
        Err(_) => SystemMetrics {
            subjects: 0,
            subjects_with_data_today: 0,
            recent_alerts: 0,
        },
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics,
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting report API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use monitor::TeachingPeriod;
    use reporting::SessionAggregator;
    use roster::RosterConfig;
    use storage::MemoryStore;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let store = Arc::new(MemoryStore::new());
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let engine = ReportEngine::with_today(store.clone(), today);
        let hub = Arc::new(Mutex::new(MonitorHub::with_aggregator(
            SessionAggregator::with_date(store, today),
            RosterConfig::default(),
            TeachingPeriod::new(true),
        )));
        Arc::new(AppState::new(engine, hub))
    }

    async fn get(path: &str) -> StatusCode {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        assert_eq!(get("/api/v1/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_daily_report_without_data_is_ok() {
        assert_eq!(
            get("/api/v1/reports/daily?name=Mina").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected() {
        assert_eq!(
            get("/api/v1/reports/daily?name=Mina&date=not-a-date").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_bad_month_is_rejected() {
        assert_eq!(
            get("/api/v1/reports/monthly?name=Mina&month=13").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_roster_stats_and_alerts() {
        assert_eq!(get("/api/v1/roster/stats").await, StatusCode::OK);
        assert_eq!(get("/api/v1/alerts?limit=5").await, StatusCode::OK);
    }
}
