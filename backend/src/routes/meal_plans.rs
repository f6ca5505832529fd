//! Meal plan API routes

use super::parse_date;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::nutrition::parse_id;
use crate::services::MealPlanService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use gymtrack_shared::types::{
    AddMealPlanItemRequest, CreateMealPlanRequest, MealPlanDayResponse, MealPlanDetailResponse,
    MealPlanItemResponse, MealPlanResponse, UpdateMealPlanRequest,
};

/// Create meal plan routes
pub fn meal_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/:id", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/:id/items", post(add_item))
        .route("/:id/items/:item_id", delete(remove_item))
        .route("/:id/days/:date", get(get_day))
}

/// POST /api/v1/meal-plans - Create a plan; an active plan deactivates the others
async fn create_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMealPlanRequest>,
) -> Result<Json<MealPlanResponse>, ApiError> {
    let plan = MealPlanService::create(state.db(), auth.user_id, req).await?;
    Ok(Json(plan))
}

/// GET /api/v1/meal-plans
async fn list_plans(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<MealPlanResponse>>, ApiError> {
    let plans = MealPlanService::list(state.db(), auth.user_id).await?;
    Ok(Json(plans))
}

/// GET /api/v1/meal-plans/:id - Plan with its items
async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MealPlanDetailResponse>, ApiError> {
    let id = parse_id("meal plan ID", &id)?;
    let plan = MealPlanService::get(state.db(), auth.user_id, id).await?;
    Ok(Json(plan))
}

/// PUT /api/v1/meal-plans/:id
async fn update_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateMealPlanRequest>,
) -> Result<Json<MealPlanResponse>, ApiError> {
    let id = parse_id("meal plan ID", &id)?;
    let plan = MealPlanService::update(state.db(), auth.user_id, id, req).await?;
    Ok(Json(plan))
}

/// DELETE /api/v1/meal-plans/:id
async fn delete_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id("meal plan ID", &id)?;
    MealPlanService::delete(state.db(), auth.user_id, id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// POST /api/v1/meal-plans/:id/items - Schedule one of the user's meals
async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddMealPlanItemRequest>,
) -> Result<Json<MealPlanItemResponse>, ApiError> {
    let id = parse_id("meal plan ID", &id)?;
    let item = MealPlanService::add_item(state.db(), auth.user_id, id, req).await?;
    Ok(Json(item))
}

/// DELETE /api/v1/meal-plans/:id/items/:item_id
async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id("meal plan ID", &id)?;
    let item_id = parse_id("item ID", &item_id)?;
    MealPlanService::remove_item(state.db(), auth.user_id, id, item_id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// GET /api/v1/meal-plans/:id/days/:date - Items of one day ordered by meal type
async fn get_day(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<MealPlanDayResponse>, ApiError> {
    let id = parse_id("meal plan ID", &id)?;
    let date = parse_date(&date)?;
    let day = MealPlanService::day(state.db(), auth.user_id, id, date).await?;
    Ok(Json(day))
}
