//! Ingredients and meals
//!
//! Meal macros are never stored: they are computed from the ingredient
//! lines (`value_per_100g * quantity_g / 100`, summed) whenever a meal is read.

use crate::error::ApiError;
use crate::repositories::{
    to_decimal, to_f64, CreateIngredient, CreateMeal, IngredientRecord, IngredientRepository,
    MealIngredientRow, MealRecord, MealRepository, UpdateIngredient, UpdateMeal,
};
use gymtrack_shared::types::{
    CreateIngredientRequest, CreateMealRequest, IngredientResponse, IngredientSearchQuery,
    MealDetailResponse, MealIngredientResponse, MealResponse, UpdateIngredientRequest, UpdateMealRequest,
};
use gymtrack_shared::validation::{validate_name, validate_per_100g, validate_quantity_g};
use gymtrack_shared::{MacroTotals, MealType};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const DEFAULT_SEARCH_LIMIT: i64 = 20;
const MAX_SEARCH_LIMIT: i64 = 100;

/// Nutrition service
pub struct NutritionService;

/// Parse an id coming from a JSON body
pub(crate) fn parse_id(field: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::Validation(format!("Invalid {}", field)))
}

/// Parse a meal type in English or Spanish
pub(crate) fn parse_meal_type(value: &str) -> Result<MealType, ApiError> {
    MealType::parse(value).ok_or_else(|| {
        ApiError::Validation("Meal type must be one of: breakfast, lunch, snack, dinner".to_string())
    })
}

/// Macros of one ingredient line
pub(crate) fn line_macros(row: &MealIngredientRow) -> MacroTotals {
    let per_100g = MacroTotals::new(
        to_f64(row.calories_per_100g),
        to_f64(row.protein_per_100g),
        to_f64(row.carbs_per_100g),
        to_f64(row.fat_per_100g),
    );
    MacroTotals::for_quantity(per_100g, to_f64(row.quantity_g))
}

/// Totals per meal for a batch of ingredient lines
pub(crate) fn totals_by_meal(rows: &[MealIngredientRow]) -> HashMap<Uuid, MacroTotals> {
    let mut totals: HashMap<Uuid, MacroTotals> = HashMap::new();
    for row in rows {
        *totals.entry(row.meal_id).or_default() += line_macros(row);
    }
    totals
}

fn to_ingredient_response(record: IngredientRecord) -> IngredientResponse {
    IngredientResponse {
        id: record.id.to_string(),
        name: record.name,
        calories_per_100g: to_f64(record.calories_per_100g),
        protein_per_100g: to_f64(record.protein_per_100g),
        carbs_per_100g: to_f64(record.carbs_per_100g),
        fat_per_100g: to_f64(record.fat_per_100g),
        is_shared: record.user_id.is_none(),
    }
}

pub(crate) fn to_meal_response(record: MealRecord) -> MealResponse {
    MealResponse {
        id: record.id.to_string(),
        name: record.name,
        meal_type: record.meal_type,
        description: record.description,
        created_at: record.created_at,
    }
}

fn to_detail(meal: MealRecord, rows: Vec<MealIngredientRow>) -> MealDetailResponse {
    let ingredients: Vec<MealIngredientResponse> = rows
        .iter()
        .map(|row| MealIngredientResponse {
            ingredient_id: row.ingredient_id.to_string(),
            name: row.name.clone(),
            quantity_g: to_f64(row.quantity_g),
            macros: line_macros(row).rounded(),
        })
        .collect();
    let totals = rows.iter().map(line_macros).sum::<MacroTotals>().rounded();

    MealDetailResponse {
        meal: to_meal_response(meal),
        ingredients,
        totals,
    }
}

impl NutritionService {
    // ------------------------------------------------------------------
    // Ingredients
    // ------------------------------------------------------------------

    pub async fn create_ingredient(
        db: &PgPool,
        user_id: Uuid,
        req: CreateIngredientRequest,
    ) -> Result<IngredientResponse, ApiError> {
        validate_name("Ingredient name", &req.name).map_err(ApiError::Validation)?;
        validate_per_100g(req.calories_per_100g, req.protein_per_100g, req.carbs_per_100g, req.fat_per_100g)
            .map_err(ApiError::Validation)?;

        let record = IngredientRepository::create(
            db,
            user_id,
            CreateIngredient {
                name: req.name.trim().to_string(),
                calories_per_100g: to_decimal(req.calories_per_100g),
                protein_per_100g: to_decimal(req.protein_per_100g),
                carbs_per_100g: to_decimal(req.carbs_per_100g),
                fat_per_100g: to_decimal(req.fat_per_100g),
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(to_ingredient_response(record))
    }

    /// Own ingredients first, then the shared catalogue
    pub async fn search_ingredients(
        db: &PgPool,
        user_id: Uuid,
        query: IngredientSearchQuery,
    ) -> Result<Vec<IngredientResponse>, ApiError> {
        let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        let records = IngredientRepository::search(db, user_id, query.q.as_deref(), limit)
            .await
            .map_err(ApiError::Internal)?;

        Ok(records.into_iter().map(to_ingredient_response).collect())
    }

    pub async fn get_ingredient(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<IngredientResponse, ApiError> {
        IngredientRepository::get_visible(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .map(to_ingredient_response)
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))
    }

    /// Only the user's own ingredients can change
    pub async fn update_ingredient(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        req: UpdateIngredientRequest,
    ) -> Result<IngredientResponse, ApiError> {
        let current = IngredientRepository::get_visible(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;
        if current.user_id.is_none() {
            return Err(ApiError::Forbidden("Shared ingredients cannot be modified".to_string()));
        }

        if let Some(name) = &req.name {
            validate_name("Ingredient name", name).map_err(ApiError::Validation)?;
        }
        validate_per_100g(
            req.calories_per_100g.unwrap_or_else(|| to_f64(current.calories_per_100g)),
            req.protein_per_100g.unwrap_or_else(|| to_f64(current.protein_per_100g)),
            req.carbs_per_100g.unwrap_or_else(|| to_f64(current.carbs_per_100g)),
            req.fat_per_100g.unwrap_or_else(|| to_f64(current.fat_per_100g)),
        )
        .map_err(ApiError::Validation)?;

        let input = UpdateIngredient {
            name: req.name.map(|n| n.trim().to_string()),
            calories_per_100g: req.calories_per_100g.map(to_decimal),
            protein_per_100g: req.protein_per_100g.map(to_decimal),
            carbs_per_100g: req.carbs_per_100g.map(to_decimal),
            fat_per_100g: req.fat_per_100g.map(to_decimal),
        };

        IngredientRepository::update(db, user_id, id, input)
            .await
            .map_err(ApiError::Internal)?
            .map(to_ingredient_response)
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))
    }

    /// Ingredients still used by a meal cannot be deleted
    pub async fn delete_ingredient(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let current = IngredientRepository::get_visible(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;
        if current.user_id.is_none() {
            return Err(ApiError::Forbidden("Shared ingredients cannot be deleted".to_string()));
        }
        if IngredientRepository::is_in_use(db, id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Ingredient is used by a meal".to_string()));
        }

        let deleted = IngredientRepository::delete(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Ingredient not found".to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Meals
    // ------------------------------------------------------------------

    pub async fn create_meal(db: &PgPool, user_id: Uuid, req: CreateMealRequest) -> Result<MealDetailResponse, ApiError> {
        validate_name("Meal name", &req.name).map_err(ApiError::Validation)?;
        let meal_type = parse_meal_type(&req.meal_type)?;

        let mut ingredients = Vec::with_capacity(req.ingredients.len());
        for line in &req.ingredients {
            let ingredient_id = parse_id("ingredient_id", &line.ingredient_id)?;
            validate_quantity_g(line.quantity_g).map_err(ApiError::Validation)?;
            if ingredients.iter().any(|(id, _)| *id == ingredient_id) {
                return Err(ApiError::Validation("Each ingredient can appear only once".to_string()));
            }
            Self::ensure_visible_ingredient(db, user_id, ingredient_id).await?;
            ingredients.push((ingredient_id, to_decimal(line.quantity_g)));
        }

        let meal = MealRepository::create(
            db,
            user_id,
            CreateMeal {
                name: req.name.trim().to_string(),
                meal_type: meal_type.as_str().to_string(),
                description: req.description,
                ingredients,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Self::detail_of(db, meal).await
    }

    pub async fn list_meals(
        db: &PgPool,
        user_id: Uuid,
        meal_type: Option<String>,
    ) -> Result<Vec<MealResponse>, ApiError> {
        let meal_type = meal_type.as_deref().map(parse_meal_type).transpose()?;
        let meals = MealRepository::list(db, user_id, meal_type.as_ref().map(MealType::as_str))
            .await
            .map_err(ApiError::Internal)?;

        Ok(meals.into_iter().map(to_meal_response).collect())
    }

    pub async fn get_meal(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<MealDetailResponse, ApiError> {
        let meal = Self::owned_meal(db, user_id, id).await?;
        Self::detail_of(db, meal).await
    }

    pub async fn update_meal(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        req: UpdateMealRequest,
    ) -> Result<MealDetailResponse, ApiError> {
        if let Some(name) = &req.name {
            validate_name("Meal name", name).map_err(ApiError::Validation)?;
        }
        let meal_type = req.meal_type.as_deref().map(parse_meal_type).transpose()?;

        let meal = MealRepository::update(
            db,
            user_id,
            id,
            UpdateMeal {
                name: req.name.map(|n| n.trim().to_string()),
                meal_type: meal_type.map(|t| t.as_str().to_string()),
                description: req.description,
            },
        )
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))?;

        Self::detail_of(db, meal).await
    }

    pub async fn delete_meal(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let deleted = MealRepository::delete(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Meal not found".to_string()));
        }
        Ok(())
    }

    /// Add the ingredient or change its quantity
    pub async fn set_ingredient_quantity(
        db: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity_g: f64,
    ) -> Result<MealDetailResponse, ApiError> {
        validate_quantity_g(quantity_g).map_err(ApiError::Validation)?;
        let meal = Self::owned_meal(db, user_id, meal_id).await?;
        Self::ensure_visible_ingredient(db, user_id, ingredient_id).await?;

        MealRepository::set_ingredient_quantity(db, meal.id, ingredient_id, to_decimal(quantity_g))
            .await
            .map_err(ApiError::Internal)?;

        Self::detail_of(db, meal).await
    }

    pub async fn remove_ingredient(
        db: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<MealDetailResponse, ApiError> {
        let meal = Self::owned_meal(db, user_id, meal_id).await?;
        let removed = MealRepository::remove_ingredient(db, meal.id, ingredient_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound("Ingredient is not part of this meal".to_string()));
        }

        Self::detail_of(db, meal).await
    }

    /// Computed totals of one meal
    pub async fn meal_totals(db: &PgPool, meal_id: Uuid) -> Result<MacroTotals, ApiError> {
        let rows = MealRepository::ingredients_for(db, &[meal_id])
            .await
            .map_err(ApiError::Internal)?;
        Ok(rows.iter().map(line_macros).sum::<MacroTotals>().rounded())
    }

    async fn owned_meal(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<MealRecord, ApiError> {
        MealRepository::get(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))
    }

    async fn ensure_visible_ingredient(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        IngredientRepository::get_visible(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("Ingredient {} not found", id)))
    }

    async fn detail_of(db: &PgPool, meal: MealRecord) -> Result<MealDetailResponse, ApiError> {
        let rows = MealRepository::ingredients_for(db, &[meal.id])
            .await
            .map_err(ApiError::Internal)?;
        Ok(to_detail(meal, rows))
    }
}
