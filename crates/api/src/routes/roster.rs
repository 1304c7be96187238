//! Roster Routes

use crate::routes::{internal_error, ErrorBody};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use roster::RosterStats;
use std::sync::Arc;

/// Get the live headcount by status
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RosterStats>, (StatusCode, Json<ErrorBody>)> {
    let hub = state.hub.lock().map_err(|_| internal_error())?;
    Ok(Json(hub.roster().stats()))
}
