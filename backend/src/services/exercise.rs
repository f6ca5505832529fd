//! Exercise logs, progress and CSV export

use crate::error::ApiError;
use crate::repositories::{
    to_decimal, to_f64, CreateExerciseLog, ExerciseLogRecord, ExerciseLogRepository, UpdateExerciseLog,
};
use chrono::{Duration, NaiveDate};
use gymtrack_shared::types::{
    ExerciseHistoryQuery, ExerciseHistoryResponse, ExerciseLogResponse, ExerciseProgressQuery,
    ExerciseProgressResponse, LogExerciseRequest, ProgressPoint, UpdateExerciseLogRequest,
};
use gymtrack_shared::validation::{
    validate_duration_minutes, validate_lift_weight, validate_name, validate_reps, validate_sets,
};
use gymtrack_shared::round1;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Default and maximum look-back of the progress endpoint
pub const DEFAULT_PROGRESS_DAYS: i64 = 90;
pub const MAX_PROGRESS_DAYS: i64 = 730;

/// Exercise service
pub struct ExerciseService;

/// sets × reps × weight; bodyweight work has no volume
pub fn volume_kg(sets: i32, reps: i32, weight_kg: Option<f64>) -> f64 {
    sets as f64 * reps as f64 * weight_kg.unwrap_or(0.0)
}

pub(crate) fn to_log_response(record: ExerciseLogRecord) -> ExerciseLogResponse {
    let weight_kg = record.weight_kg.map(to_f64);
    ExerciseLogResponse {
        id: record.id.to_string(),
        volume_kg: round1(volume_kg(record.sets, record.reps, weight_kg)),
        exercise_name: record.exercise_name,
        muscle_group: record.muscle_group,
        sets: record.sets,
        reps: record.reps,
        weight_kg,
        duration_minutes: record.duration_minutes,
        notes: record.notes,
        performed_on: record.performed_on,
        created_at: record.created_at,
    }
}

#[derive(Debug, Serialize)]
struct ExerciseCsvRow {
    date: String,
    exercise: String,
    muscle_group: String,
    sets: i32,
    reps: i32,
    weight_kg: String,
    duration_minutes: String,
    volume_kg: f64,
    notes: String,
}

fn to_csv(records: Vec<ExerciseLogRecord>) -> Result<String, ApiError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        let weight_kg = record.weight_kg.map(to_f64);
        let row = ExerciseCsvRow {
            date: record.performed_on.format("%Y-%m-%d").to_string(),
            volume_kg: round1(volume_kg(record.sets, record.reps, weight_kg)),
            exercise: record.exercise_name,
            muscle_group: record.muscle_group.unwrap_or_default(),
            sets: record.sets,
            reps: record.reps,
            weight_kg: weight_kg.map(|w| w.to_string()).unwrap_or_default(),
            duration_minutes: record.duration_minutes.map(|d| d.to_string()).unwrap_or_default(),
            notes: record.notes.unwrap_or_default(),
        };
        wtr.serialize(row)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
}

fn validate_log_fields(
    sets: i32,
    reps: i32,
    weight_kg: Option<f64>,
    duration_minutes: Option<i32>,
) -> Result<(), ApiError> {
    validate_sets(sets).map_err(ApiError::Validation)?;
    validate_reps(reps).map_err(ApiError::Validation)?;
    if let Some(weight) = weight_kg {
        validate_lift_weight(weight).map_err(ApiError::Validation)?;
    }
    if let Some(minutes) = duration_minutes {
        validate_duration_minutes(minutes).map_err(ApiError::Validation)?;
    }
    Ok(())
}

impl ExerciseService {
    pub async fn log(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
        req: LogExerciseRequest,
    ) -> Result<ExerciseLogResponse, ApiError> {
        validate_name("Exercise name", &req.exercise_name).map_err(ApiError::Validation)?;
        validate_log_fields(req.sets, req.reps, req.weight_kg, req.duration_minutes)?;

        let record = ExerciseLogRepository::create(
            db,
            user_id,
            CreateExerciseLog {
                exercise_name: req.exercise_name.trim().to_string(),
                muscle_group: req.muscle_group,
                sets: req.sets,
                reps: req.reps,
                weight_kg: req.weight_kg.map(to_decimal),
                duration_minutes: req.duration_minutes,
                notes: req.notes,
                performed_on: req.performed_on.unwrap_or(today),
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(to_log_response(record))
    }

    /// Paginated history, newest first
    pub async fn history(
        db: &PgPool,
        user_id: Uuid,
        query: ExerciseHistoryQuery,
    ) -> Result<ExerciseHistoryResponse, ApiError> {
        if let (Some(start), Some(end)) = (query.start, query.end) {
            if end < start {
                return Err(ApiError::Validation("end cannot be before start".to_string()));
            }
        }
        let (limit, offset) = query.limit_offset();

        let (records, total_count) =
            ExerciseLogRepository::list_paginated(db, user_id, query.start, query.end, limit, offset)
                .await
                .map_err(ApiError::Internal)?;

        let items: Vec<ExerciseLogResponse> = records.into_iter().map(to_log_response).collect();
        let has_more = offset + (items.len() as i64) < total_count;

        Ok(ExerciseHistoryResponse {
            items,
            total_count,
            limit,
            offset,
            has_more,
        })
    }

    pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<ExerciseLogResponse, ApiError> {
        ExerciseLogRepository::get(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .map(to_log_response)
            .ok_or_else(|| ApiError::NotFound("Exercise log not found".to_string()))
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        req: UpdateExerciseLogRequest,
    ) -> Result<ExerciseLogResponse, ApiError> {
        let current = ExerciseLogRepository::get(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Exercise log not found".to_string()))?;

        if let Some(name) = &req.exercise_name {
            validate_name("Exercise name", name).map_err(ApiError::Validation)?;
        }
        validate_log_fields(
            req.sets.unwrap_or(current.sets),
            req.reps.unwrap_or(current.reps),
            req.weight_kg,
            req.duration_minutes,
        )?;

        let input = UpdateExerciseLog {
            exercise_name: req.exercise_name.map(|n| n.trim().to_string()),
            muscle_group: req.muscle_group,
            sets: req.sets,
            reps: req.reps,
            weight_kg: req.weight_kg.map(to_decimal),
            duration_minutes: req.duration_minutes,
            notes: req.notes,
            performed_on: req.performed_on,
        };

        ExerciseLogRepository::update(db, user_id, id, input)
            .await
            .map_err(ApiError::Internal)?
            .map(to_log_response)
            .ok_or_else(|| ApiError::NotFound("Exercise log not found".to_string()))
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let deleted = ExerciseLogRepository::delete(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Exercise log not found".to_string()));
        }
        Ok(())
    }

    /// Per-day progress of one exercise plus its all-time best
    pub async fn progress(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
        query: ExerciseProgressQuery,
    ) -> Result<ExerciseProgressResponse, ApiError> {
        validate_name("Exercise", &query.exercise).map_err(ApiError::Validation)?;
        let days = query.days.unwrap_or(DEFAULT_PROGRESS_DAYS).clamp(1, MAX_PROGRESS_DAYS);
        let since = today - Duration::days(days - 1);

        let rows = ExerciseLogRepository::progress(db, user_id, &query.exercise, since, today)
            .await
            .map_err(ApiError::Internal)?;
        let personal_best_kg = ExerciseLogRepository::personal_best(db, user_id, &query.exercise, today)
            .await
            .map_err(ApiError::Internal)?;

        Ok(ExerciseProgressResponse {
            exercise: query.exercise.trim().to_string(),
            days,
            points: rows
                .into_iter()
                .map(|r| ProgressPoint {
                    date: r.performed_on,
                    max_weight_kg: round1(r.max_weight_kg),
                    volume_kg: round1(r.volume_kg),
                    sets: r.sets,
                })
                .collect(),
            personal_best_kg,
        })
    }

    /// All logs as CSV, oldest first
    pub async fn export_csv(db: &PgPool, user_id: Uuid) -> Result<String, ApiError> {
        let records = ExerciseLogRepository::list_all(db, user_id)
            .await
            .map_err(ApiError::Internal)?;
        to_csv(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn record(name: &str, weight: Option<Decimal>) -> ExerciseLogRecord {
        ExerciseLogRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            exercise_name: name.to_string(),
            muscle_group: Some("piernas".to_string()),
            sets: 4,
            reps: 8,
            weight_kg: weight,
            duration_minutes: None,
            notes: None,
            performed_on: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_volume() {
        assert_eq!(volume_kg(4, 8, Some(100.0)), 3200.0);
        assert_eq!(volume_kg(3, 12, None), 0.0);
    }

    #[test]
    fn test_log_response_includes_volume() {
        let response = to_log_response(record("Sentadilla", Some(Decimal::new(1025, 1))));
        assert_eq!(response.weight_kg, Some(102.5));
        assert_eq!(response.volume_kg, 3280.0);
    }

    #[test]
    fn test_csv_export() {
        let csv = to_csv(vec![
            record("Sentadilla", Some(Decimal::new(100, 0))),
            record("Dominadas, lastre", None),
        ])
        .unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("date,exercise,muscle_group,sets,reps,weight_kg,duration_minutes,volume_kg,notes")
        );
        assert_eq!(lines.next(), Some("2024-03-04,Sentadilla,piernas,4,8,100,,3200.0,"));
        assert_eq!(lines.next(), Some("2024-03-04,\"Dominadas, lastre\",piernas,4,8,,,0.0,"));
    }

    #[test]
    fn test_validate_log_fields() {
        assert!(validate_log_fields(4, 8, Some(100.0), Some(60)).is_ok());
        assert!(validate_log_fields(0, 8, None, None).is_err());
        assert!(validate_log_fields(4, 8, Some(-5.0), None).is_err());
        assert!(validate_log_fields(4, 8, None, Some(2000)).is_err());
    }

    proptest! {
        #[test]
        fn prop_volume_never_negative(sets in 1i32..=100, reps in 1i32..=1000, weight in 0.0f64..=1000.0) {
            prop_assert!(volume_kg(sets, reps, Some(weight)) >= 0.0);
        }
    }
}
