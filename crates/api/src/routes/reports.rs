//! Report Routes

use crate::routes::{bad_request, ErrorBody};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use reporting::{DailyReport, FocusGrade, MonthlyComparison, MonthlyReport, WeeklyReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiError = (StatusCode, Json<ErrorBody>);

/// Query parameters for the daily report endpoint
#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub name: String,
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
}

/// Query parameters for the weekly/comparison endpoints
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

/// Query parameters for the monthly report endpoint
#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub name: String,
    pub year: Option<i32>,
    /// 1-12
    pub month: Option<u32>,
}

/// Daily report plus its letter grade
#[derive(Debug, Serialize)]
pub struct DailyResponse {
    #[serde(flatten)]
    pub report: DailyReport,
    pub grade: FocusGrade,
}

/// Weekly report plus its letter grade
#[derive(Debug, Serialize)]
pub struct WeeklyResponse {
    #[serde(flatten)]
    pub report: WeeklyReport,
    pub grade: FocusGrade,
}

/// Monthly report plus its letter grade
#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    #[serde(flatten)]
    pub report: MonthlyReport,
    pub grade: FocusGrade,
}

/// Get one day's report
pub async fn get_daily(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DailyQuery>,
) -> Result<Json<DailyResponse>, ApiError> {
    let date = params
        .date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| bad_request(format!("invalid date: {}", raw)))
        })
        .transpose()?;

    let report = state.engine.daily_report(&params.name, date);
    let grade = FocusGrade::for_rate(report.focus_rate);
    Ok(Json(DailyResponse { report, grade }))
}

/// Get this week's rollup
pub async fn get_weekly(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NameQuery>,
) -> Json<WeeklyResponse> {
    let report = state.engine.weekly_report(&params.name);
    let grade = FocusGrade::for_rate(report.focus_rate);
    Json(WeeklyResponse { report, grade })
}

/// Get a calendar month's rollup
pub async fn get_monthly(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthlyQuery>,
) -> Result<Json<MonthlyResponse>, ApiError> {
    if let Some(month) = params.month {
        if !(1..=12).contains(&month) {
            return Err(bad_request(format!("invalid month: {}", month)));
        }
    }

    let report = state
        .engine
        .monthly_report(&params.name, params.year, params.month);
    let grade = FocusGrade::for_rate(report.focus_rate);
    Ok(Json(MonthlyResponse { report, grade }))
}

/// Get the month-over-month comparison
pub async fn get_comparison(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NameQuery>,
) -> Json<MonthlyComparison> {
    Json(state.engine.monthly_comparison(&params.name))
}
