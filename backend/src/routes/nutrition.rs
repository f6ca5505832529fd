//! Ingredient and meal API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::nutrition::parse_id;
use crate::services::NutritionService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use gymtrack_shared::types::{
    CreateIngredientRequest, CreateMealRequest, IngredientResponse, IngredientSearchQuery,
    MealDetailResponse, MealListQuery, MealResponse, SetIngredientQuantityRequest,
    UpdateIngredientRequest, UpdateMealRequest,
};

/// Create nutrition routes
pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(search_ingredients).post(create_ingredient))
        .route(
            "/ingredients/:id",
            get(get_ingredient).put(update_ingredient).delete(delete_ingredient),
        )
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal).put(update_meal).delete(delete_meal))
        .route(
            "/meals/:id/ingredients/:ingredient_id",
            put(set_ingredient_quantity).delete(remove_ingredient),
        )
}

/// POST /api/v1/nutrition/ingredients - Create a private ingredient
async fn create_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateIngredientRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let ingredient = NutritionService::create_ingredient(state.db(), auth.user_id, req).await?;
    Ok(Json(ingredient))
}

/// GET /api/v1/nutrition/ingredients?q&limit - Search own and shared ingredients
async fn search_ingredients(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<IngredientSearchQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let ingredients = NutritionService::search_ingredients(state.db(), auth.user_id, query).await?;
    Ok(Json(ingredients))
}

/// GET /api/v1/nutrition/ingredients/:id
async fn get_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let id = parse_id("ingredient ID", &id)?;
    let ingredient = NutritionService::get_ingredient(state.db(), auth.user_id, id).await?;
    Ok(Json(ingredient))
}

/// PUT /api/v1/nutrition/ingredients/:id
async fn update_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateIngredientRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let id = parse_id("ingredient ID", &id)?;
    let ingredient = NutritionService::update_ingredient(state.db(), auth.user_id, id, req).await?;
    Ok(Json(ingredient))
}

/// DELETE /api/v1/nutrition/ingredients/:id
async fn delete_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id("ingredient ID", &id)?;
    NutritionService::delete_ingredient(state.db(), auth.user_id, id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// POST /api/v1/nutrition/meals - Create a meal with its ingredients
async fn create_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMealRequest>,
) -> Result<Json<MealDetailResponse>, ApiError> {
    let meal = NutritionService::create_meal(state.db(), auth.user_id, req).await?;
    Ok(Json(meal))
}

/// GET /api/v1/nutrition/meals?meal_type
async fn list_meals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MealListQuery>,
) -> Result<Json<Vec<MealResponse>>, ApiError> {
    let meals = NutritionService::list_meals(state.db(), auth.user_id, query.meal_type).await?;
    Ok(Json(meals))
}

/// GET /api/v1/nutrition/meals/:id - Meal with ingredient lines and totals
async fn get_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MealDetailResponse>, ApiError> {
    let id = parse_id("meal ID", &id)?;
    let meal = NutritionService::get_meal(state.db(), auth.user_id, id).await?;
    Ok(Json(meal))
}

/// PUT /api/v1/nutrition/meals/:id
async fn update_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateMealRequest>,
) -> Result<Json<MealDetailResponse>, ApiError> {
    let id = parse_id("meal ID", &id)?;
    let meal = NutritionService::update_meal(state.db(), auth.user_id, id, req).await?;
    Ok(Json(meal))
}

/// DELETE /api/v1/nutrition/meals/:id
async fn delete_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id("meal ID", &id)?;
    NutritionService::delete_meal(state.db(), auth.user_id, id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// PUT /api/v1/nutrition/meals/:id/ingredients/:ingredient_id - Add or change a quantity
async fn set_ingredient_quantity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((meal_id, ingredient_id)): Path<(String, String)>,
    Json(req): Json<SetIngredientQuantityRequest>,
) -> Result<Json<MealDetailResponse>, ApiError> {
    let meal_id = parse_id("meal ID", &meal_id)?;
    let ingredient_id = parse_id("ingredient ID", &ingredient_id)?;
    let meal =
        NutritionService::set_ingredient_quantity(state.db(), auth.user_id, meal_id, ingredient_id, req.quantity_g)
            .await?;
    Ok(Json(meal))
}

/// DELETE /api/v1/nutrition/meals/:id/ingredients/:ingredient_id
async fn remove_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((meal_id, ingredient_id)): Path<(String, String)>,
) -> Result<Json<MealDetailResponse>, ApiError> {
    let meal_id = parse_id("meal ID", &meal_id)?;
    let ingredient_id = parse_id("ingredient ID", &ingredient_id)?;
    let meal = NutritionService::remove_ingredient(state.db(), auth.user_id, meal_id, ingredient_id).await?;
    Ok(Json(meal))
}
