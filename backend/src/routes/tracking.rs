//! Daily food tracking routes

use super::parse_date;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::nutrition::parse_id;
use crate::services::TrackingService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use gymtrack_shared::types::{CreateTrackingEntryRequest, DailyTrackingResponse, TrackingEntryResponse};

/// Create tracking routes
pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_entry))
        .route("/plan-items/:item_id", post(track_plan_item))
        .route("/entries/:id", delete(delete_entry))
        .route("/:date", get(get_day))
}

/// POST /api/v1/tracking - Record a free-form entry
async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTrackingEntryRequest>,
) -> Result<Json<TrackingEntryResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let entry = TrackingService::create_entry(state.db(), auth.user_id, today, req).await?;
    Ok(Json(entry))
}

/// POST /api/v1/tracking/plan-items/:item_id - Mark a planned meal as eaten
///
/// Returns 409 when the item was already tracked.
async fn track_plan_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<TrackingEntryResponse>, ApiError> {
    let item_id = parse_id("item ID", &item_id)?;
    let entry = TrackingService::track_plan_item(state.db(), auth.user_id, item_id).await?;
    Ok(Json(entry))
}

/// GET /api/v1/tracking/:date - Entries, totals and remaining targets of a day
async fn get_day(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DailyTrackingResponse>, ApiError> {
    let date = parse_date(&date)?;
    let day = TrackingService::daily(state.db(), auth.user_id, date).await?;
    Ok(Json(day))
}

/// DELETE /api/v1/tracking/entries/:id
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id("entry ID", &id)?;
    TrackingService::delete_entry(state.db(), auth.user_id, id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}
