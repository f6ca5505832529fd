//! Daily tracking repository (what was actually eaten)

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Tracking entry record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackingRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tracking_date: NaiveDate,
    pub meal_type: String,
    pub description: String,
    pub meal_plan_item_id: Option<Uuid>,
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbs_g: Decimal,
    pub fat_g: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for a tracking entry
#[derive(Debug, Clone)]
pub struct CreateTrackingEntry {
    pub tracking_date: NaiveDate,
    pub meal_type: String,
    pub description: String,
    pub meal_plan_item_id: Option<Uuid>,
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbs_g: Decimal,
    pub fat_g: Decimal,
}

/// Tracking repository
pub struct TrackingRepository;

impl TrackingRepository {
    /// Insert an entry
    ///
    /// Returns `None` when the planned item was already recorded
    /// (unique index on user and plan item).
    pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateTrackingEntry) -> Result<Option<TrackingRecord>> {
        let record = sqlx::query_as::<_, TrackingRecord>(
            r#"
            INSERT INTO daily_tracking (
                user_id, tracking_date, meal_type, description, meal_plan_item_id,
                calories, protein_g, carbs_g, fat_g
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, meal_plan_item_id) WHERE meal_plan_item_id IS NOT NULL
            DO NOTHING
            RETURNING id, user_id, tracking_date, meal_type, description, meal_plan_item_id,
                      calories, protein_g, carbs_g, fat_g, created_at
            "#,
        )
        .bind(user_id)
        .bind(input.tracking_date)
        .bind(&input.meal_type)
        .bind(&input.description)
        .bind(input.meal_plan_item_id)
        .bind(input.calories)
        .bind(input.protein_g)
        .bind(input.carbs_g)
        .bind(input.fat_g)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Entries of one day, in meal order then insertion order
    pub async fn get_by_date(pool: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<Vec<TrackingRecord>> {
        let records = sqlx::query_as::<_, TrackingRecord>(
            r#"
            SELECT id, user_id, tracking_date, meal_type, description, meal_plan_item_id,
                   calories, protein_g, carbs_g, fat_g, created_at
            FROM daily_tracking
            WHERE user_id = $1 AND tracking_date = $2
            ORDER BY CASE meal_type
                        WHEN 'breakfast' THEN 0
                        WHEN 'lunch' THEN 1
                        WHEN 'snack' THEN 2
                        WHEN 'dinner' THEN 3
                        ELSE 4
                     END,
                     created_at
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Delete one of the user's entries
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM daily_tracking WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
