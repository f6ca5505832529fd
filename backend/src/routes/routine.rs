//! Weekly routine routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::RoutineService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use gymtrack_shared::types::{DateQuery, ReplaceRoutineRequest, RoutineResponse, TodayRoutineResponse};

/// Create routine routes
pub fn routine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_week).put(replace_week))
        .route("/today", get(get_today))
}

/// GET /api/v1/routine - Whole week ordered by day and position
async fn get_week(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RoutineResponse>, ApiError> {
    let routine = RoutineService::get_week(state.db(), auth.user_id).await?;
    Ok(Json(routine))
}

/// PUT /api/v1/routine - Replace the whole week
async fn replace_week(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ReplaceRoutineRequest>,
) -> Result<Json<RoutineResponse>, ApiError> {
    let routine = RoutineService::replace_week(state.db(), auth.user_id, req).await?;
    Ok(Json(routine))
}

/// GET /api/v1/routine/today?date - Entries of the day with completion flags
async fn get_today(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DateQuery>,
) -> Result<Json<TodayRoutineResponse>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let today = RoutineService::for_date(state.db(), auth.user_id, date).await?;
    Ok(Json(today))
}
