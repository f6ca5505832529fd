//! Weekly routine repository

use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Routine entry record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoutineRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: i16,
    pub exercise_name: String,
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub target_weight_kg: Option<Decimal>,
    pub position: i32,
}

/// Input for one routine entry
#[derive(Debug, Clone)]
pub struct CreateRoutineEntry {
    pub day_of_week: i16,
    pub exercise_name: String,
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub target_weight_kg: Option<Decimal>,
}

/// Routine repository
pub struct RoutineRepository;

impl RoutineRepository {
    /// The whole week ordered by day and position
    pub async fn get_week(pool: &PgPool, user_id: Uuid) -> Result<Vec<RoutineRecord>> {
        let records = sqlx::query_as::<_, RoutineRecord>(
            r#"
            SELECT id, user_id, day_of_week, exercise_name, muscle_group, sets, reps,
                   target_weight_kg, position
            FROM routine_exercises
            WHERE user_id = $1
            ORDER BY day_of_week, position
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Entries of one weekday
    pub async fn get_day(pool: &PgPool, user_id: Uuid, day_of_week: i16) -> Result<Vec<RoutineRecord>> {
        let records = sqlx::query_as::<_, RoutineRecord>(
            r#"
            SELECT id, user_id, day_of_week, exercise_name, muscle_group, sets, reps,
                   target_weight_kg, position
            FROM routine_exercises
            WHERE user_id = $1 AND day_of_week = $2
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .bind(day_of_week)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Replace the whole week in one transaction
    ///
    /// Positions are assigned per day in input order, starting at 0.
    pub async fn replace_week(
        pool: &PgPool,
        user_id: Uuid,
        entries: Vec<CreateRoutineEntry>,
    ) -> Result<Vec<RoutineRecord>> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM routine_exercises WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut next_position = [0i32; 8];
        for entry in &entries {
            let slot = entry.day_of_week.clamp(0, 7) as usize;
            let position = next_position[slot];
            next_position[slot] += 1;

            sqlx::query(
                r#"
                INSERT INTO routine_exercises (user_id, day_of_week, exercise_name, muscle_group,
                                               sets, reps, target_weight_kg, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(user_id)
            .bind(entry.day_of_week)
            .bind(&entry.exercise_name)
            .bind(&entry.muscle_group)
            .bind(entry.sets)
            .bind(entry.reps)
            .bind(entry.target_weight_kg)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        let records = sqlx::query_as::<_, RoutineRecord>(
            r#"
            SELECT id, user_id, day_of_week, exercise_name, muscle_group, sets, reps,
                   target_weight_kg, position
            FROM routine_exercises
            WHERE user_id = $1
            ORDER BY day_of_week, position
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(records)
    }
}
