//! Ingredient and meal repositories

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

// ============================================================================
// Ingredients
// ============================================================================

/// Ingredient record from database (values per 100 g)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientRecord {
    pub id: Uuid,
    /// None for the shared catalogue
    pub user_id: Option<Uuid>,
    pub name: String,
    pub calories_per_100g: Decimal,
    pub protein_per_100g: Decimal,
    pub carbs_per_100g: Decimal,
    pub fat_per_100g: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an ingredient
#[derive(Debug, Clone)]
pub struct CreateIngredient {
    pub name: String,
    pub calories_per_100g: Decimal,
    pub protein_per_100g: Decimal,
    pub carbs_per_100g: Decimal,
    pub fat_per_100g: Decimal,
}

/// Partial ingredient update
#[derive(Debug, Clone, Default)]
pub struct UpdateIngredient {
    pub name: Option<String>,
    pub calories_per_100g: Option<Decimal>,
    pub protein_per_100g: Option<Decimal>,
    pub carbs_per_100g: Option<Decimal>,
    pub fat_per_100g: Option<Decimal>,
}

/// `LIKE` pattern matching `query` literally anywhere in the value
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Ingredient repository
pub struct IngredientRepository;

impl IngredientRepository {
    /// Create a user-owned ingredient
    pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateIngredient) -> Result<IngredientRecord> {
        let record = sqlx::query_as::<_, IngredientRecord>(
            r#"
            INSERT INTO ingredients (user_id, name, calories_per_100g, protein_per_100g,
                                     carbs_per_100g, fat_per_100g)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, calories_per_100g, protein_per_100g,
                      carbs_per_100g, fat_per_100g, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.calories_per_100g)
        .bind(input.protein_per_100g)
        .bind(input.carbs_per_100g)
        .bind(input.fat_per_100g)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Search the user's ingredients and the shared catalogue
    ///
    /// Matching is a case-insensitive substring on the name; an empty query
    /// lists everything visible.
    pub async fn search(
        pool: &PgPool,
        user_id: Uuid,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<IngredientRecord>> {
        let pattern = contains_pattern(query.unwrap_or(""));
        let records = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, user_id, name, calories_per_100g, protein_per_100g,
                   carbs_per_100g, fat_per_100g, created_at
            FROM ingredients
            WHERE (user_id = $1 OR user_id IS NULL)
              AND LOWER(name) LIKE LOWER($2) ESCAPE '\'
            ORDER BY (user_id IS NULL), name
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get an ingredient the user can see (own or shared)
    pub async fn get_visible(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<IngredientRecord>> {
        let record = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, user_id, name, calories_per_100g, protein_per_100g,
                   carbs_per_100g, fat_per_100g, created_at
            FROM ingredients
            WHERE id = $2 AND (user_id = $1 OR user_id IS NULL)
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Update one of the user's own ingredients
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        input: UpdateIngredient,
    ) -> Result<Option<IngredientRecord>> {
        let record = sqlx::query_as::<_, IngredientRecord>(
            r#"
            UPDATE ingredients SET
                name = COALESCE($3, name),
                calories_per_100g = COALESCE($4, calories_per_100g),
                protein_per_100g = COALESCE($5, protein_per_100g),
                carbs_per_100g = COALESCE($6, carbs_per_100g),
                fat_per_100g = COALESCE($7, fat_per_100g)
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, name, calories_per_100g, protein_per_100g,
                      carbs_per_100g, fat_per_100g, created_at
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(&input.name)
        .bind(input.calories_per_100g)
        .bind(input.protein_per_100g)
        .bind(input.carbs_per_100g)
        .bind(input.fat_per_100g)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Whether any meal still uses the ingredient
    pub async fn is_in_use(pool: &PgPool, id: Uuid) -> Result<bool> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM meal_ingredients WHERE ingredient_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(in_use)
    }

    /// Delete one of the user's own ingredients
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM ingredients WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Meals
// ============================================================================

/// Meal record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub meal_type: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingredient line of a meal joined with the ingredient's nutrition values
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealIngredientRow {
    pub meal_id: Uuid,
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity_g: Decimal,
    pub calories_per_100g: Decimal,
    pub protein_per_100g: Decimal,
    pub carbs_per_100g: Decimal,
    pub fat_per_100g: Decimal,
}

/// Input for creating a meal
#[derive(Debug, Clone)]
pub struct CreateMeal {
    pub name: String,
    pub meal_type: String,
    pub description: Option<String>,
    /// (ingredient id, quantity in grams)
    pub ingredients: Vec<(Uuid, Decimal)>,
}

/// Partial meal update
#[derive(Debug, Clone, Default)]
pub struct UpdateMeal {
    pub name: Option<String>,
    pub meal_type: Option<String>,
    pub description: Option<String>,
}

/// Meal repository
pub struct MealRepository;

impl MealRepository {
    /// Create a meal with its ingredient lines in one transaction
    pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateMeal) -> Result<MealRecord> {
        let mut tx = pool.begin().await?;

        let meal = sqlx::query_as::<_, MealRecord>(
            r#"
            INSERT INTO meals (user_id, name, meal_type, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, meal_type, description, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.meal_type)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        for (ingredient_id, quantity_g) in &input.ingredients {
            sqlx::query(
                r#"
                INSERT INTO meal_ingredients (meal_id, ingredient_id, quantity_g)
                VALUES ($1, $2, $3)
                ON CONFLICT (meal_id, ingredient_id)
                DO UPDATE SET quantity_g = meal_ingredients.quantity_g + EXCLUDED.quantity_g
                "#,
            )
            .bind(meal.id)
            .bind(ingredient_id)
            .bind(quantity_g)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(meal)
    }

    /// List the user's meals, optionally filtered by meal type
    pub async fn list(pool: &PgPool, user_id: Uuid, meal_type: Option<&str>) -> Result<Vec<MealRecord>> {
        let records = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, name, meal_type, description, created_at, updated_at
            FROM meals
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR meal_type = $2)
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .bind(meal_type)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get one of the user's meals
    pub async fn get(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<MealRecord>> {
        let record = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, name, meal_type, description, created_at, updated_at
            FROM meals
            WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Update one of the user's meals
    pub async fn update(pool: &PgPool, user_id: Uuid, id: Uuid, input: UpdateMeal) -> Result<Option<MealRecord>> {
        let record = sqlx::query_as::<_, MealRecord>(
            r#"
            UPDATE meals SET
                name = COALESCE($3, name),
                meal_type = COALESCE($4, meal_type),
                description = COALESCE($5, description),
                updated_at = NOW()
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, name, meal_type, description, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(&input.name)
        .bind(&input.meal_type)
        .bind(&input.description)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete one of the user's meals (ingredient lines and plan items cascade)
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM meals WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ingredient lines of several meals at once
    pub async fn ingredients_for(pool: &PgPool, meal_ids: &[Uuid]) -> Result<Vec<MealIngredientRow>> {
        let rows = sqlx::query_as::<_, MealIngredientRow>(
            r#"
            SELECT mi.meal_id, mi.ingredient_id, i.name, mi.quantity_g,
                   i.calories_per_100g, i.protein_per_100g, i.carbs_per_100g, i.fat_per_100g
            FROM meal_ingredients mi
            JOIN ingredients i ON i.id = mi.ingredient_id
            WHERE mi.meal_id = ANY($1)
            ORDER BY mi.meal_id, i.name
            "#,
        )
        .bind(meal_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Set the quantity of an ingredient within a meal, adding the line if missing
    pub async fn set_ingredient_quantity(
        pool: &PgPool,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity_g: Decimal,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meal_ingredients (meal_id, ingredient_id, quantity_g)
            VALUES ($1, $2, $3)
            ON CONFLICT (meal_id, ingredient_id) DO UPDATE SET quantity_g = EXCLUDED.quantity_g
            "#,
        )
        .bind(meal_id)
        .bind(ingredient_id)
        .bind(quantity_g)
        .execute(pool)
        .await?;

        sqlx::query("UPDATE meals SET updated_at = NOW() WHERE id = $1")
            .bind(meal_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Remove an ingredient line from a meal
    pub async fn remove_ingredient(pool: &PgPool, meal_id: Uuid, ingredient_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM meal_ingredients WHERE meal_id = $1 AND ingredient_id = $2
            "#,
        )
        .bind(meal_id)
        .bind(ingredient_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("aven", "%aven%")]
    #[case("  pollo ", "%pollo%")]
    #[case("", "%%")]
    #[case("_", r"%\_%")]
    #[case("100%", r"%100\%%")]
    #[case(r"a\b", r"%a\\b%")]
    fn test_contains_pattern_escapes_wildcards(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(query), expected);
    }
}
