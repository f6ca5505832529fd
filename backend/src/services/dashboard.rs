//! Dashboard summary

use super::meal_plan::to_plan_response;
use super::routine::RoutineService;
use super::tracking::TrackingService;
use crate::error::ApiError;
use crate::repositories::{ExerciseLogRepository, MealPlanRepository};
use chrono::{Duration, NaiveDate};
use gymtrack_shared::round1;
use gymtrack_shared::types::DashboardResponse;
use sqlx::PgPool;
use uuid::Uuid;

/// Days counted as "recent" training, today included
pub const TRAINING_WINDOW_DAYS: i64 = 7;

/// Dashboard service
pub struct DashboardService;

/// First day of the training window ending on `today`
pub(crate) fn window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(TRAINING_WINDOW_DAYS - 1)
}

impl DashboardService {
    pub async fn summary(db: &PgPool, user_id: Uuid, today: NaiveDate) -> Result<DashboardResponse, ApiError> {
        let nutrition = TrackingService::daily(db, user_id, today).await?;

        let (workouts, volume) = ExerciseLogRepository::training_summary(db, user_id, window_start(today), today)
            .await
            .map_err(ApiError::Internal)?;

        let active_meal_plan = MealPlanRepository::get_active(db, user_id)
            .await
            .map_err(ApiError::Internal)?
            .map(to_plan_response);

        let today_routine = RoutineService::for_date(db, user_id, today).await?;

        Ok(DashboardResponse {
            date: today,
            nutrition,
            workouts_last_7_days: workouts,
            volume_last_7_days_kg: round1(volume),
            active_meal_plan,
            today_routine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_covers_seven_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(window_start(today), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }
}
