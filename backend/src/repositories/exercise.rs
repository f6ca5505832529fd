//! Exercise log repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Exercise log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_name: String,
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub weight_kg: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub performed_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for logging an exercise
#[derive(Debug, Clone)]
pub struct CreateExerciseLog {
    pub exercise_name: String,
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub weight_kg: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub performed_on: NaiveDate,
}

/// Partial exercise log update
#[derive(Debug, Clone, Default)]
pub struct UpdateExerciseLog {
    pub exercise_name: Option<String>,
    pub muscle_group: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight_kg: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub performed_on: Option<NaiveDate>,
}

/// Per-day aggregate for one exercise
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub performed_on: NaiveDate,
    pub max_weight_kg: f64,
    pub volume_kg: f64,
    pub sets: i64,
}

/// Per-exercise aggregate over a window
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseSummaryRow {
    pub exercise_name: String,
    pub sessions: i64,
    pub first_max_kg: f64,
    pub last_max_kg: f64,
    pub best_kg: f64,
    pub volume_kg: f64,
}

const LOG_COLUMNS: &str = "id, user_id, exercise_name, muscle_group, sets, reps, weight_kg, \
                           duration_minutes, notes, performed_on, created_at";

/// Exercise log repository
pub struct ExerciseLogRepository;

impl ExerciseLogRepository {
    /// Log a performed exercise
    pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateExerciseLog) -> Result<ExerciseLogRecord> {
        let record = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            r#"
            INSERT INTO exercise_logs (user_id, exercise_name, muscle_group, sets, reps,
                                       weight_kg, duration_minutes, notes, performed_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&input.exercise_name)
        .bind(&input.muscle_group)
        .bind(input.sets)
        .bind(input.reps)
        .bind(input.weight_kg)
        .bind(input.duration_minutes)
        .bind(&input.notes)
        .bind(input.performed_on)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Get one of the user's logs
    pub async fn get(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<ExerciseLogRecord>> {
        let record = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            "SELECT {LOG_COLUMNS} FROM exercise_logs WHERE id = $2 AND user_id = $1"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Paginated history, newest first, with the total count for the range
    pub async fn list_paginated(
        pool: &PgPool,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ExerciseLogRecord>, i64)> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM exercise_logs
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR performed_on >= $2)
              AND ($3::DATE IS NULL OR performed_on <= $3)
            ORDER BY performed_on DESC, created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM exercise_logs
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR performed_on >= $2)
              AND ($3::DATE IS NULL OR performed_on <= $3)
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok((records, total))
    }

    /// Every log of the user between two dates (inclusive), newest first
    pub async fn list_between(
        pool: &PgPool,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ExerciseLogRecord>> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM exercise_logs
            WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3
            ORDER BY performed_on DESC, created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Every log of the user, oldest first (CSV export)
    pub async fn list_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<ExerciseLogRecord>> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM exercise_logs
            WHERE user_id = $1
            ORDER BY performed_on, created_at
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Update one of the user's logs
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        input: UpdateExerciseLog,
    ) -> Result<Option<ExerciseLogRecord>> {
        let record = sqlx::query_as::<_, ExerciseLogRecord>(&format!(
            r#"
            UPDATE exercise_logs SET
                exercise_name = COALESCE($3, exercise_name),
                muscle_group = COALESCE($4, muscle_group),
                sets = COALESCE($5, sets),
                reps = COALESCE($6, reps),
                weight_kg = COALESCE($7, weight_kg),
                duration_minutes = COALESCE($8, duration_minutes),
                notes = COALESCE($9, notes),
                performed_on = COALESCE($10, performed_on)
            WHERE id = $2 AND user_id = $1
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(id)
        .bind(&input.exercise_name)
        .bind(&input.muscle_group)
        .bind(input.sets)
        .bind(input.reps)
        .bind(input.weight_kg)
        .bind(input.duration_minutes)
        .bind(&input.notes)
        .bind(input.performed_on)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete one of the user's logs
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM exercise_logs WHERE id = $2 AND user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Per-day max weight, volume and sets of one exercise (name matched case-insensitively)
    pub async fn progress(
        pool: &PgPool,
        user_id: Uuid,
        exercise_name: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ProgressRow>> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT performed_on,
                   COALESCE(MAX(weight_kg), 0)::FLOAT8 AS max_weight_kg,
                   COALESCE(SUM(sets * reps * COALESCE(weight_kg, 0)), 0)::FLOAT8 AS volume_kg,
                   COALESCE(SUM(sets), 0)::INT8 AS sets
            FROM exercise_logs
            WHERE user_id = $1
              AND LOWER(exercise_name) = LOWER($2)
              AND performed_on BETWEEN $3 AND $4
            GROUP BY performed_on
            ORDER BY performed_on
            "#,
        )
        .bind(user_id)
        .bind(exercise_name.trim())
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Heaviest weight logged for an exercise up to a date
    pub async fn personal_best(
        pool: &PgPool,
        user_id: Uuid,
        exercise_name: &str,
        until: NaiveDate,
    ) -> Result<Option<f64>> {
        let best = sqlx::query_scalar::<_, Option<f64>>(
            r#"
            SELECT MAX(weight_kg)::FLOAT8
            FROM exercise_logs
            WHERE user_id = $1 AND LOWER(exercise_name) = LOWER($2) AND performed_on <= $3
            "#,
        )
        .bind(user_id)
        .bind(exercise_name.trim())
        .bind(until)
        .fetch_one(pool)
        .await?;

        Ok(best)
    }

    /// Number of distinct training days and total volume between two dates (inclusive)
    pub async fn training_summary(
        pool: &PgPool,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<(i64, f64)> {
        let row = sqlx::query_as::<_, (i64, f64)>(
            r#"
            SELECT COUNT(DISTINCT performed_on)::INT8,
                   COALESCE(SUM(sets * reps * COALESCE(weight_kg, 0)), 0)::FLOAT8
            FROM exercise_logs
            WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Lower-cased names of the exercises logged on a date
    pub async fn names_logged_on(pool: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT LOWER(exercise_name)
            FROM exercise_logs
            WHERE user_id = $1 AND performed_on = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(names)
    }

    /// Per-exercise progress summary between two dates, most trained first
    pub async fn summaries_between(
        pool: &PgPool,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ExerciseSummaryRow>> {
        let rows = sqlx::query_as::<_, ExerciseSummaryRow>(
            r#"
            WITH daily AS (
                SELECT LOWER(exercise_name) AS key,
                       MIN(exercise_name) AS exercise_name,
                       performed_on,
                       COALESCE(MAX(weight_kg), 0) AS max_kg,
                       SUM(sets * reps * COALESCE(weight_kg, 0)) AS volume
                FROM exercise_logs
                WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3
                GROUP BY LOWER(exercise_name), performed_on
            )
            SELECT MIN(exercise_name) AS exercise_name,
                   COUNT(*)::INT8 AS sessions,
                   (ARRAY_AGG(max_kg ORDER BY performed_on))[1]::FLOAT8 AS first_max_kg,
                   (ARRAY_AGG(max_kg ORDER BY performed_on DESC))[1]::FLOAT8 AS last_max_kg,
                   MAX(max_kg)::FLOAT8 AS best_kg,
                   COALESCE(SUM(volume), 0)::FLOAT8 AS volume_kg
            FROM daily
            GROUP BY key
            ORDER BY sessions DESC, exercise_name
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
