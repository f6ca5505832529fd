//! Weekly routine and today's checklist

use crate::error::ApiError;
use crate::repositories::{to_decimal, to_f64, CreateRoutineEntry, ExerciseLogRepository, RoutineRecord, RoutineRepository};
use chrono::NaiveDate;
use gymtrack_shared::types::{
    ReplaceRoutineRequest, RoutineEntryResponse, RoutineResponse, TodayRoutineEntry, TodayRoutineResponse,
};
use gymtrack_shared::validation::{
    validate_day_of_week, validate_lift_weight, validate_name, validate_reps, validate_sets,
};
use gymtrack_shared::{iso_weekday, weekday_name_es};
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

/// Upper bound on entries in one week
pub const MAX_ROUTINE_ENTRIES: usize = 100;

/// Routine service
pub struct RoutineService;

fn to_entry_response(record: RoutineRecord) -> RoutineEntryResponse {
    RoutineEntryResponse {
        id: record.id.to_string(),
        day_of_week: record.day_of_week,
        day_name: weekday_name_es(record.day_of_week).to_string(),
        exercise_name: record.exercise_name,
        muscle_group: record.muscle_group,
        sets: record.sets,
        reps: record.reps,
        target_weight_kg: record.target_weight_kg.map(to_f64),
        position: record.position,
    }
}

/// Mark entries done when an exercise with the same name (any case) was logged
pub(crate) fn checklist(date: NaiveDate, records: Vec<RoutineRecord>, logged: &[String]) -> TodayRoutineResponse {
    let logged: HashSet<String> = logged.iter().map(|name| name.trim().to_lowercase()).collect();
    let day_of_week = iso_weekday(date);

    let entries: Vec<TodayRoutineEntry> = records
        .into_iter()
        .map(|record| {
            let done = logged.contains(&record.exercise_name.trim().to_lowercase());
            TodayRoutineEntry {
                entry: to_entry_response(record),
                done,
            }
        })
        .collect();
    let completed = entries.iter().filter(|e| e.done).count();

    TodayRoutineResponse {
        date,
        day_of_week,
        day_name: weekday_name_es(day_of_week).to_string(),
        total: entries.len(),
        completed,
        entries,
    }
}

fn build_entries(req: ReplaceRoutineRequest) -> Result<Vec<CreateRoutineEntry>, ApiError> {
    if req.entries.len() > MAX_ROUTINE_ENTRIES {
        return Err(ApiError::Validation(format!(
            "A routine can have at most {} entries",
            MAX_ROUTINE_ENTRIES
        )));
    }

    req.entries
        .into_iter()
        .map(|entry| {
            validate_day_of_week(entry.day_of_week).map_err(ApiError::Validation)?;
            validate_name("Exercise name", &entry.exercise_name).map_err(ApiError::Validation)?;
            validate_sets(entry.sets).map_err(ApiError::Validation)?;
            validate_reps(entry.reps).map_err(ApiError::Validation)?;
            if let Some(weight) = entry.target_weight_kg {
                validate_lift_weight(weight).map_err(ApiError::Validation)?;
            }
            Ok(CreateRoutineEntry {
                day_of_week: entry.day_of_week,
                exercise_name: entry.exercise_name.trim().to_string(),
                muscle_group: entry.muscle_group,
                sets: entry.sets,
                reps: entry.reps,
                target_weight_kg: entry.target_weight_kg.map(to_decimal),
            })
        })
        .collect()
}

impl RoutineService {
    pub async fn get_week(db: &PgPool, user_id: Uuid) -> Result<RoutineResponse, ApiError> {
        let records = RoutineRepository::get_week(db, user_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(RoutineResponse {
            entries: records.into_iter().map(to_entry_response).collect(),
        })
    }

    /// Replace the whole week; nothing is written if any entry is invalid
    pub async fn replace_week(
        db: &PgPool,
        user_id: Uuid,
        req: ReplaceRoutineRequest,
    ) -> Result<RoutineResponse, ApiError> {
        let entries = build_entries(req)?;
        let count = entries.len();

        let records = RoutineRepository::replace_week(db, user_id, entries)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user_id, entries = count, "Routine replaced");
        Ok(RoutineResponse {
            entries: records.into_iter().map(to_entry_response).collect(),
        })
    }

    /// Routine of the weekday of `date` with completion flags
    pub async fn for_date(db: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<TodayRoutineResponse, ApiError> {
        let records = RoutineRepository::get_day(db, user_id, iso_weekday(date))
            .await
            .map_err(ApiError::Internal)?;
        let logged = ExerciseLogRepository::names_logged_on(db, user_id, date)
            .await
            .map_err(ApiError::Internal)?;

        Ok(checklist(date, records, &logged))
    }
}
