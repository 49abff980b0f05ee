//! Admin dashboard aggregates.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppResult;
use crate::queries::order::{self, DailySales, DashboardStats, PopularLocation};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub daily_sales: Vec<DailySales>,
    pub popular_locations: Vec<PopularLocation>,
}

/// GET /api/admin/dashboard (ADMIN)
pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DashboardView>> {
    let stats = order::dashboard_stats(&state.pool).await?;
    let daily_sales = order::daily_sales(&state.pool, params.start_date, params.end_date).await?;
    let popular_locations = order::popular_locations(&state.pool).await?;

    Ok(Json(DashboardView {
        stats,
        daily_sales,
        popular_locations,
    }))
}
