//! Alert Routes

use crate::routes::{internal_error, ErrorBody};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use alerting::AlertEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for the alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Maximum number of entries, newest first
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for the alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub data: Vec<AlertEntry>,
    pub count: usize,
}

/// Get recent alerts
pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<AlertResponse>, (StatusCode, Json<ErrorBody>)> {
    let hub = state.hub.lock().map_err(|_| internal_error())?;
    let data = hub.alert_log().recent(params.limit);
    Ok(Json(AlertResponse {
        count: data.len(),
        data,
    }))
}
