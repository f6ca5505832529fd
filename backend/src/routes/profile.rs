//! Nutrition profile routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use gymtrack_shared::types::{NutritionProfileResponse, UpsertProfileRequest};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(upsert_profile))
}

/// GET /api/v1/profile - Get the nutrition profile and its targets
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<NutritionProfileResponse>, ApiError> {
    let profile = ProfileService::get(state.db(), auth.user_id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile - Create or replace the profile and recompute targets
async fn upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<NutritionProfileResponse>, ApiError> {
    let profile = ProfileService::upsert(state.db(), auth.user_id, req).await?;
    Ok(Json(profile))
}
