//! Month routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use apunta_core::currency::AverageRate;
use apunta_core::ledger::MonthRecord;
use apunta_core::settlement::MonthStats;

use crate::{ApiError, AppState};

/// Creates the month routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/months", get(list_months).post(create_month))
        .route("/months/{name}/activate", post(activate_month))
}

/// Month without its entries.
#[derive(Debug, Serialize)]
pub struct MonthSummary {
    /// Display name.
    pub group_name: String,
    /// First day of the month.
    pub start_date: NaiveDate,
    /// Whether the month is active.
    pub active: bool,
    /// Number of entries.
    pub entry_count: usize,
    /// Average rates per currency.
    pub avg_rates: Vec<AverageRate>,
    /// Per-payer statistics.
    pub stats: MonthStats,
}

impl From<&MonthRecord> for MonthSummary {
    fn from(month: &MonthRecord) -> Self {
        Self {
            group_name: month.group_name.clone(),
            start_date: month.start_date,
            active: month.active,
            entry_count: month.entries.len(),
            avg_rates: month.avg_rates.clone(),
            stats: month.stats.clone(),
        }
    }
}

/// Request body for `POST /months`.
#[derive(Debug, Deserialize)]
pub struct CreateMonthRequest {
    /// Any day in the month; stored as the first of the month.
    pub start_date: NaiveDate,
    /// Unique display name.
    pub group_name: String,
}

/// GET `/months` - All months in date order.
async fn list_months(State(state): State<AppState>) -> Json<Vec<MonthSummary>> {
    let document = state.document.read().await;
    Json(document.months.iter().map(MonthSummary::from).collect())
}

/// POST `/months` - Create a month.
async fn create_month(
    State(state): State<AppState>,
    Json(request): Json<CreateMonthRequest>,
) -> Result<(StatusCode, Json<MonthSummary>), ApiError> {
    let mut document = state.document.write().await;
    document.create_month(request.start_date, &request.group_name)?;
    state.persist(&document).await?;

    let month = document.month_by_name(request.group_name.trim())?;
    Ok((StatusCode::CREATED, Json(MonthSummary::from(month))))
}

/// POST `/months/{name}/activate` - Make a month the active one.
async fn activate_month(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MonthSummary>, ApiError> {
    let mut document = state.document.write().await;
    document.set_active_month(&name)?;
    state.persist(&document).await?;

    let month = document.month_by_name(&name)?;
    Ok(Json(MonthSummary::from(month)))
}
