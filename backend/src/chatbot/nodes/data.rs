//! User data the chatbot nodes read
//!
//! Nodes only see these snapshots through [`FitnessData`], so they can be
//! exercised without a database.

use crate::repositories::{
    to_f64, ExerciseLogRepository, ProfileRepository, RoutineRepository, TrackingRepository,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use gymtrack_shared::MacroTotals;
use sqlx::PgPool;
use uuid::Uuid;

/// One logged exercise
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedExercise {
    pub performed_on: NaiveDate,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: i32,
    pub weight_kg: Option<f64>,
}

/// One tracked meal
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMeal {
    pub meal_type: String,
    pub description: String,
    pub calories: f64,
}

/// What was eaten on one day against the profile targets
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionSnapshot {
    pub date: NaiveDate,
    pub meals: Vec<TrackedMeal>,
    pub totals: MacroTotals,
    pub targets: Option<MacroTotals>,
}

/// How one exercise evolved over a window
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    pub exercise_name: String,
    pub sessions: i64,
    pub first_max_kg: f64,
    pub last_max_kg: f64,
    pub best_kg: f64,
    pub volume_kg: f64,
}

/// One entry of the weekly routine
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineItem {
    pub day_of_week: i16,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: i32,
    pub target_weight_kg: Option<f64>,
}

/// Read access to a user's fitness data
#[async_trait]
pub trait FitnessData: Send + Sync {
    /// Logs performed between `since` and `until` (inclusive), newest first
    async fn exercise_logs_between(
        &self,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> anyhow::Result<Vec<LoggedExercise>>;

    async fn nutrition_on(&self, user_id: Uuid, date: NaiveDate) -> anyhow::Result<NutritionSnapshot>;

    /// Per-exercise progress between `since` and `until`, most trained first
    async fn progress_between(
        &self,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> anyhow::Result<Vec<ProgressSummary>>;

    /// Whole week ordered by day and position
    async fn weekly_routine(&self, user_id: Uuid) -> anyhow::Result<Vec<RoutineItem>>;
}

/// [`FitnessData`] backed by Postgres
#[derive(Clone)]
pub struct PgFitnessData {
    pool: PgPool,
}

impl PgFitnessData {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FitnessData for PgFitnessData {
    async fn exercise_logs_between(
        &self,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> anyhow::Result<Vec<LoggedExercise>> {
        let records = ExerciseLogRepository::list_between(&self.pool, user_id, since, until).await?;
        Ok(records
            .into_iter()
            .map(|r| LoggedExercise {
                performed_on: r.performed_on,
                exercise_name: r.exercise_name,
                sets: r.sets,
                reps: r.reps,
                weight_kg: r.weight_kg.map(to_f64),
            })
            .collect())
    }

    async fn nutrition_on(&self, user_id: Uuid, date: NaiveDate) -> anyhow::Result<NutritionSnapshot> {
        let entries = TrackingRepository::get_by_date(&self.pool, user_id, date).await?;
        let profile = ProfileRepository::get(&self.pool, user_id).await?;

        let totals = entries
            .iter()
            .map(|e| MacroTotals::new(to_f64(e.calories), to_f64(e.protein_g), to_f64(e.carbs_g), to_f64(e.fat_g)))
            .sum();
        let meals = entries
            .into_iter()
            .map(|e| TrackedMeal {
                meal_type: e.meal_type,
                description: e.description,
                calories: to_f64(e.calories),
            })
            .collect();
        let targets = profile.map(|p| {
            MacroTotals::new(
                to_f64(p.target_calories),
                to_f64(p.target_protein_g),
                to_f64(p.target_carbs_g),
                to_f64(p.target_fat_g),
            )
        });

        Ok(NutritionSnapshot {
            date,
            meals,
            totals,
            targets,
        })
    }

    async fn progress_between(
        &self,
        user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> anyhow::Result<Vec<ProgressSummary>> {
        let rows = ExerciseLogRepository::summaries_between(&self.pool, user_id, since, until).await?;
        Ok(rows
            .into_iter()
            .map(|r| ProgressSummary {
                exercise_name: r.exercise_name,
                sessions: r.sessions,
                first_max_kg: r.first_max_kg,
                last_max_kg: r.last_max_kg,
                best_kg: r.best_kg,
                volume_kg: r.volume_kg,
            })
            .collect())
    }

    async fn weekly_routine(&self, user_id: Uuid) -> anyhow::Result<Vec<RoutineItem>> {
        let records = RoutineRepository::get_week(&self.pool, user_id).await?;
        Ok(records
            .into_iter()
            .map(|r| RoutineItem {
                day_of_week: r.day_of_week,
                exercise_name: r.exercise_name,
                sets: r.sets,
                reps: r.reps,
                target_weight_kg: r.target_weight_kg.map(to_f64),
            })
            .collect())
    }
}
