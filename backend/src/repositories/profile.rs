//! Nutrition profile repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Nutrition profile record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub sex: String,
    pub age_years: i32,
    pub height_cm: Decimal,
    pub weight_kg: Decimal,
    pub activity_level: String,
    pub goal: String,
    pub bmr: Decimal,
    pub tdee: Decimal,
    pub target_calories: Decimal,
    pub target_protein_g: Decimal,
    pub target_carbs_g: Decimal,
    pub target_fat_g: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a profile
#[derive(Debug, Clone)]
pub struct UpsertProfile {
    pub sex: String,
    pub age_years: i32,
    pub height_cm: Decimal,
    pub weight_kg: Decimal,
    pub activity_level: String,
    pub goal: String,
    pub bmr: Decimal,
    pub tdee: Decimal,
    pub target_calories: Decimal,
    pub target_protein_g: Decimal,
    pub target_carbs_g: Decimal,
    pub target_fat_g: Decimal,
}

/// Nutrition profile repository
pub struct ProfileRepository;

impl ProfileRepository {
    /// Get a user's profile
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRecord>> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT user_id, sex, age_years, height_cm, weight_kg, activity_level, goal,
                   bmr, tdee, target_calories, target_protein_g, target_carbs_g,
                   target_fat_g, updated_at
            FROM nutrition_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Insert or replace a user's profile
    pub async fn upsert(pool: &PgPool, user_id: Uuid, input: UpsertProfile) -> Result<ProfileRecord> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO nutrition_profiles (
                user_id, sex, age_years, height_cm, weight_kg, activity_level, goal,
                bmr, tdee, target_calories, target_protein_g, target_carbs_g, target_fat_g
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id) DO UPDATE SET
                sex = EXCLUDED.sex,
                age_years = EXCLUDED.age_years,
                height_cm = EXCLUDED.height_cm,
                weight_kg = EXCLUDED.weight_kg,
                activity_level = EXCLUDED.activity_level,
                goal = EXCLUDED.goal,
                bmr = EXCLUDED.bmr,
                tdee = EXCLUDED.tdee,
                target_calories = EXCLUDED.target_calories,
                target_protein_g = EXCLUDED.target_protein_g,
                target_carbs_g = EXCLUDED.target_carbs_g,
                target_fat_g = EXCLUDED.target_fat_g,
                updated_at = NOW()
            RETURNING user_id, sex, age_years, height_cm, weight_kg, activity_level, goal,
                      bmr, tdee, target_calories, target_protein_g, target_carbs_g,
                      target_fat_g, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.sex)
        .bind(input.age_years)
        .bind(input.height_cm)
        .bind(input.weight_kg)
        .bind(&input.activity_level)
        .bind(&input.goal)
        .bind(input.bmr)
        .bind(input.tdee)
        .bind(input.target_calories)
        .bind(input.target_protein_g)
        .bind(input.target_carbs_g)
        .bind(input.target_fat_g)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
