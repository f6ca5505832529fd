//! API request and response types
//!
//! These are the JSON shapes of the `/api/v1` surface. The Telegram bot
//! deserialises the same types, so they live here rather than in the backend.

use crate::models::{ChatRole, Intent};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

// ============================================================================
// Shared Building Blocks
// ============================================================================

/// Energy and macronutrient amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl MacroTotals {
    pub fn new(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    /// Scale per-100g values to a quantity in grams
    pub fn for_quantity(per_100g: MacroTotals, quantity_g: f64) -> Self {
        let factor = quantity_g / 100.0;
        Self {
            calories: per_100g.calories * factor,
            protein_g: per_100g.protein_g * factor,
            carbs_g: per_100g.carbs_g * factor,
            fat_g: per_100g.fat_g * factor,
        }
    }

    /// Difference to a target; negative values mean the target was exceeded
    pub fn remaining_from(&self, target: &MacroTotals) -> MacroTotals {
        MacroTotals {
            calories: target.calories - self.calories,
            protein_g: target.protein_g - self.protein_g,
            carbs_g: target.carbs_g - self.carbs_g,
            fat_g: target.fat_g - self.fat_g,
        }
    }

    /// Round every field to one decimal place
    pub fn rounded(&self) -> MacroTotals {
        MacroTotals {
            calories: crate::health_metrics::round1(self.calories),
            protein_g: crate::health_metrics::round1(self.protein_g),
            carbs_g: crate::health_metrics::round1(self.carbs_g),
            fat_g: crate::health_metrics::round1(self.fat_g),
        }
    }
}

impl Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, rhs: MacroTotals) -> MacroTotals {
        MacroTotals {
            calories: self.calories + rhs.calories,
            protein_g: self.protein_g + rhs.protein_g,
            carbs_g: self.carbs_g + rhs.carbs_g,
            fat_g: self.fat_g + rhs.fat_g,
        }
    }
}

impl AddAssign for MacroTotals {
    fn add_assign(&mut self, rhs: MacroTotals) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = MacroTotals>>(iter: I) -> Self {
        iter.fold(MacroTotals::default(), Add::add)
    }
}

/// Date query (`?date=YYYY-MM-DD`), defaults to today when absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

// ============================================================================
// Auth
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Refresh token request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Google sign-in request carrying the ID token from the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub telegram_linked: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Nutrition Profile
// ============================================================================

/// Create or replace the nutrition profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertProfileRequest {
    pub sex: String,
    pub age_years: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: String,
    #[serde(default)]
    pub goal: Option<String>,
}

/// Nutrition profile with computed energy targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionProfileResponse {
    pub sex: String,
    pub age_years: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: String,
    pub goal: String,
    pub bmr: f64,
    pub tdee: f64,
    pub targets: MacroTotals,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Ingredients and Meals
// ============================================================================

/// Ingredient creation request (values per 100 g)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
}

/// Partial ingredient update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
}

/// Ingredient search query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientSearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Ingredient response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub id: String,
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    /// True for catalogue ingredients that belong to nobody
    pub is_shared: bool,
}

/// Ingredient line when creating a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealIngredientInput {
    pub ingredient_id: String,
    pub quantity_g: f64,
}

/// Meal creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    pub meal_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<MealIngredientInput>,
}

/// Partial meal update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub meal_type: Option<String>,
    pub description: Option<String>,
}

/// Set the quantity of one ingredient within a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIngredientQuantityRequest {
    pub quantity_g: f64,
}

/// Meal list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealListQuery {
    #[serde(default)]
    pub meal_type: Option<String>,
}

/// Meal summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealResponse {
    pub id: String,
    pub name: String,
    pub meal_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One ingredient line within a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealIngredientResponse {
    pub ingredient_id: String,
    pub name: String,
    pub quantity_g: f64,
    pub macros: MacroTotals,
}

/// Meal with its ingredients and computed totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealDetailResponse {
    pub meal: MealResponse,
    pub ingredients: Vec<MealIngredientResponse>,
    pub totals: MacroTotals,
}

// ============================================================================
// Meal Plans
// ============================================================================

fn default_true() -> bool {
    true
}

/// Meal plan creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMealPlanRequest {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial meal plan update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMealPlanRequest {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Meal plan summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanResponse {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Schedule a meal within a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMealPlanItemRequest {
    pub meal_id: String,
    pub plan_date: NaiveDate,
    /// Defaults to the meal's own type
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Scheduled meal within a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanItemResponse {
    pub id: String,
    pub meal_id: String,
    pub meal_name: String,
    pub plan_date: NaiveDate,
    pub meal_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub totals: MacroTotals,
}

/// Meal plan with all scheduled items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanDetailResponse {
    pub plan: MealPlanResponse,
    pub items: Vec<MealPlanItemResponse>,
}

/// Items of a plan for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanDayResponse {
    pub plan_id: String,
    pub date: NaiveDate,
    pub items: Vec<MealPlanItemResponse>,
    pub totals: MacroTotals,
}

// ============================================================================
// Daily Tracking
// ============================================================================

/// Free-form tracking entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrackingEntryRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub meal_type: String,
    pub description: String,
    /// Computed from the macros when omitted
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

/// Tracking entry response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEntryResponse {
    pub id: String,
    pub date: NaiveDate,
    pub meal_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_plan_item_id: Option<String>,
    pub macros: MacroTotals,
    pub created_at: DateTime<Utc>,
}

/// What was eaten on a day compared with the profile targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTrackingResponse {
    pub date: NaiveDate,
    pub entries: Vec<TrackingEntryResponse>,
    pub totals: MacroTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<MacroTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<MacroTotals>,
}

// ============================================================================
// Exercise Logs
// ============================================================================

/// Log a performed exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExerciseRequest {
    pub exercise_name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to today
    #[serde(default)]
    pub performed_on: Option<NaiveDate>,
}

/// Partial exercise log update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExerciseLogRequest {
    pub exercise_name: Option<String>,
    pub muscle_group: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight_kg: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub performed_on: Option<NaiveDate>,
}

/// Exercise log response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogResponse {
    pub id: String,
    pub exercise_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub performed_on: NaiveDate,
    /// sets × reps × weight
    pub volume_kg: f64,
    pub created_at: DateTime<Utc>,
}

/// Exercise history query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseHistoryQuery {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ExerciseHistoryQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp limit into `1..=MAX_LIMIT` and offset to non-negative
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Paginated exercise history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseHistoryResponse {
    pub items: Vec<ExerciseLogResponse>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Progress query for one exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseProgressQuery {
    pub exercise: String,
    #[serde(default)]
    pub days: Option<i64>,
}

/// Progress of one exercise on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub max_weight_kg: f64,
    pub volume_kg: f64,
    pub sets: i64,
}

/// Progress of one exercise over a window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseProgressResponse {
    pub exercise: String,
    pub days: i64,
    pub points: Vec<ProgressPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_best_kg: Option<f64>,
}

// ============================================================================
// Weekly Routine
// ============================================================================

/// One exercise of the weekly routine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineEntryInput {
    pub day_of_week: i16,
    pub exercise_name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
}

/// Replace the whole weekly routine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRoutineRequest {
    pub entries: Vec<RoutineEntryInput>,
}

/// Stored routine entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineEntryResponse {
    pub id: String,
    pub day_of_week: i16,
    pub day_name: String,
    pub exercise_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    pub sets: i32,
    pub reps: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    pub position: i32,
}

/// Whole weekly routine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineResponse {
    pub entries: Vec<RoutineEntryResponse>,
}

/// Routine entry for a day with completion status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayRoutineEntry {
    #[serde(flatten)]
    pub entry: RoutineEntryResponse,
    pub done: bool,
}

/// Routine of one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayRoutineResponse {
    pub date: NaiveDate,
    pub day_of_week: i16,
    pub day_name: String,
    pub entries: Vec<TodayRoutineEntry>,
    pub completed: usize,
    pub total: usize,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Dashboard summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub nutrition: DailyTrackingResponse,
    pub workouts_last_7_days: i64,
    pub volume_last_7_days_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_meal_plan: Option<MealPlanResponse>,
    pub today_routine: TodayRoutineResponse,
}

// ============================================================================
// Chatbot
// ============================================================================

/// Message sent to the chatbot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Chatbot answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Markdown reply
    pub reply: String,
    pub intent: Intent,
    /// "llm" or "keywords"
    pub classified_by: String,
}

/// Stored chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryItem {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub created_at: DateTime<Utc>,
}

/// Chat history, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatHistoryItem>,
}

// ============================================================================
// Telegram
// ============================================================================

/// Code a web user sends to the bot with `/vincular`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCodeResponse {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Bot request to bind a Telegram account to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotLinkRequest {
    pub code: String,
    pub telegram_id: i64,
    #[serde(default)]
    pub telegram_username: Option<String>,
}

/// Account the Telegram id was bound to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotLinkResponse {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}
