//! Meal plan repository

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Meal plan record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealPlanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlanRecord {
    /// Whether a date falls inside the plan's range
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Scheduled meal joined with the meal's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealPlanItemRecord {
    pub id: Uuid,
    pub meal_plan_id: Uuid,
    pub meal_id: Uuid,
    pub meal_name: String,
    pub plan_date: NaiveDate,
    pub meal_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a meal plan
#[derive(Debug, Clone)]
pub struct CreateMealPlan {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

/// Partial meal plan update
#[derive(Debug, Clone, Default)]
pub struct UpdateMealPlan {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Input for scheduling a meal
#[derive(Debug, Clone)]
pub struct CreateMealPlanItem {
    pub meal_id: Uuid,
    pub plan_date: NaiveDate,
    pub meal_type: String,
    pub notes: Option<String>,
}

const ITEM_SELECT: &str = r#"
    SELECT it.id, it.meal_plan_id, it.meal_id, m.name AS meal_name, it.plan_date,
           it.meal_type, it.notes, it.created_at
    FROM meal_plan_items it
    JOIN meals m ON m.id = it.meal_id
"#;

/// Meal plan repository
pub struct MealPlanRepository;

impl MealPlanRepository {
    /// Create a plan; an active plan deactivates the user's other plans
    pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateMealPlan) -> Result<MealPlanRecord> {
        let mut tx = pool.begin().await?;

        if input.is_active {
            sqlx::query(
                r#"
                UPDATE meal_plans SET is_active = FALSE, updated_at = NOW()
                WHERE user_id = $1 AND is_active
                "#,
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let plan = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            INSERT INTO meal_plans (user_id, name, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, start_date, end_date, is_active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(plan)
    }

    /// List the user's plans, newest first
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<MealPlanRecord>> {
        let records = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            SELECT id, user_id, name, start_date, end_date, is_active, created_at, updated_at
            FROM meal_plans
            WHERE user_id = $1
            ORDER BY start_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get one of the user's plans
    pub async fn get(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<MealPlanRecord>> {
        let record = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            SELECT id, user_id, name, start_date, end_date, is_active, created_at, updated_at
            FROM meal_plans
            WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// The user's active plan, if any
    pub async fn get_active(pool: &PgPool, user_id: Uuid) -> Result<Option<MealPlanRecord>> {
        let record = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            SELECT id, user_id, name, start_date, end_date, is_active, created_at, updated_at
            FROM meal_plans
            WHERE user_id = $1 AND is_active
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Update one of the user's plans; activating it deactivates the others
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        input: UpdateMealPlan,
    ) -> Result<Option<MealPlanRecord>> {
        let mut tx = pool.begin().await?;

        if input.is_active == Some(true) {
            sqlx::query(
                r#"
                UPDATE meal_plans SET is_active = FALSE, updated_at = NOW()
                WHERE user_id = $1 AND id <> $2 AND is_active
                "#,
            )
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let record = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            UPDATE meal_plans SET
                name = COALESCE($3, name),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, name, start_date, end_date, is_active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(&input.name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        // Nothing matched: leave the other plans untouched
        if record.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(record)
    }

    /// Delete one of the user's plans (items cascade)
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM meal_plans WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Schedule a meal in a plan
    pub async fn add_item(pool: &PgPool, plan_id: Uuid, input: CreateMealPlanItem) -> Result<MealPlanItemRecord> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO meal_plan_items (meal_plan_id, meal_id, plan_date, meal_type, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(plan_id)
        .bind(input.meal_id)
        .bind(input.plan_date)
        .bind(&input.meal_type)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        let item = sqlx::query_as::<_, MealPlanItemRecord>(&format!("{ITEM_SELECT} WHERE it.id = $1"))
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(item)
    }

    /// All items of a plan ordered by date
    pub async fn items(pool: &PgPool, plan_id: Uuid) -> Result<Vec<MealPlanItemRecord>> {
        let items = sqlx::query_as::<_, MealPlanItemRecord>(&format!(
            "{ITEM_SELECT} WHERE it.meal_plan_id = $1 ORDER BY it.plan_date, it.created_at"
        ))
        .bind(plan_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Items of a plan on one date
    pub async fn items_on(pool: &PgPool, plan_id: Uuid, date: NaiveDate) -> Result<Vec<MealPlanItemRecord>> {
        let items = sqlx::query_as::<_, MealPlanItemRecord>(&format!(
            "{ITEM_SELECT} WHERE it.meal_plan_id = $1 AND it.plan_date = $2 ORDER BY it.created_at"
        ))
        .bind(plan_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Find an item in any of the user's plans
    pub async fn find_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<Option<MealPlanItemRecord>> {
        let item = sqlx::query_as::<_, MealPlanItemRecord>(&format!(
            r#"{ITEM_SELECT}
            JOIN meal_plans p ON p.id = it.meal_plan_id
            WHERE it.id = $2 AND p.user_id = $1"#
        ))
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Remove an item from a plan
    pub async fn remove_item(pool: &PgPool, plan_id: Uuid, item_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM meal_plan_items WHERE id = $2 AND meal_plan_id = $1
            "#,
        )
        .bind(plan_id)
        .bind(item_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
