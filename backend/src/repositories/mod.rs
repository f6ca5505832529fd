//! Database repositories
//!
//! Provides data access layer for database operations. Every query on
//! user-owned rows is scoped by `user_id`.

pub mod chat;
pub mod exercise;
pub mod meal_plan;
pub mod nutrition;
pub mod profile;
pub mod routine;
pub mod tracking;
pub mod user;

pub use chat::{ChatMessageRecord, ChatRepository};
pub use exercise::{
    CreateExerciseLog, ExerciseLogRecord, ExerciseLogRepository, ExerciseSummaryRow, ProgressRow,
    UpdateExerciseLog,
};
pub use meal_plan::{
    CreateMealPlan, CreateMealPlanItem, MealPlanItemRecord, MealPlanRecord, MealPlanRepository,
    UpdateMealPlan,
};
pub use nutrition::{
    CreateIngredient, CreateMeal, IngredientRecord, IngredientRepository, MealIngredientRow,
    MealRecord, MealRepository, UpdateIngredient, UpdateMeal,
};
pub use profile::{ProfileRecord, ProfileRepository, UpsertProfile};
pub use routine::{CreateRoutineEntry, RoutineRecord, RoutineRepository};
pub use tracking::{CreateTrackingEntry, TrackingRecord, TrackingRepository};
pub use user::{CreateUser, TelegramLinkOutcome, UserRecord, UserRepository};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Convert an API value to the NUMERIC representation, rounded to 2 places
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

/// Convert a NUMERIC column back to f64
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_conversions() {
        assert_eq!(to_decimal(82.456), Decimal::new(8246, 2));
        assert_eq!(to_f64(Decimal::new(1005, 1)), 100.5);
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }
}
