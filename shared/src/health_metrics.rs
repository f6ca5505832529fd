//! Energy and macronutrient calculations
//!
//! Provides BMR, TDEE and daily macro targets derived from a user's
//! nutrition profile.
//!
//! All functions are pure and work in SI units (kg, cm, kcal, grams).

use serde::{Deserialize, Serialize};

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex for metabolic calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

impl BiologicalSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiologicalSex::Male => "male",
            BiologicalSex::Female => "female",
        }
    }

    /// Parse from the stored lowercase representation
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" | "m" | "hombre" => Some(BiologicalSex::Male),
            "female" | "f" | "mujer" => Some(BiologicalSex::Female),
            _ => None,
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    #[default]
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise, physical job
    ExtraActive,
}

impl ActivityLevel {
    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "lightly_active" => Some(ActivityLevel::LightlyActive),
            "moderately_active" => Some(ActivityLevel::ModeratelyActive),
            "very_active" => Some(ActivityLevel::VeryActive),
            "extra_active" => Some(ActivityLevel::ExtraActive),
            _ => None,
        }
    }
}

/// What the user is trying to achieve with their diet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    #[default]
    Maintain,
    GainMuscle,
}

impl FitnessGoal {
    /// Daily calorie adjustment applied on top of TDEE
    pub fn calorie_adjustment(&self) -> f64 {
        match self {
            FitnessGoal::LoseWeight => -500.0,
            FitnessGoal::Maintain => 0.0,
            FitnessGoal::GainMuscle => 300.0,
        }
    }

    /// Protein target in grams per kg of body weight
    pub fn protein_per_kg(&self) -> f64 {
        match self {
            FitnessGoal::LoseWeight | FitnessGoal::Maintain => 1.6,
            FitnessGoal::GainMuscle => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "lose_weight",
            FitnessGoal::Maintain => "maintain",
            FitnessGoal::GainMuscle => "gain_muscle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lose_weight" | "lose" | "cut" => Some(FitnessGoal::LoseWeight),
            "maintain" | "maintenance" => Some(FitnessGoal::Maintain),
            "gain_muscle" | "gain" | "bulk" => Some(FitnessGoal::GainMuscle),
            _ => None,
        }
    }
}

/// Profile data needed for energy calculations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfile {
    /// Height in centimeters
    pub height_cm: f64,
    /// Current weight in kilograms
    pub weight_kg: f64,
    /// Age in years
    pub age_years: i32,
    pub sex: BiologicalSex,
    pub activity_level: ActivityLevel,
}

// ============================================================================
// BMR and TDEE
// ============================================================================

/// Lower bound for any calorie target we hand out
pub const MIN_DAILY_CALORIES: f64 = 1200.0;

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: i32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// Calculate Total Daily Energy Expenditure
///
/// TDEE = BMR × Activity Multiplier
pub fn calculate_tdee(profile: &HealthProfile) -> f64 {
    let bmr = calculate_bmr_mifflin(profile.weight_kg, profile.height_cm, profile.age_years, profile.sex);
    bmr * profile.activity_level.multiplier()
}

/// Energy from macronutrients (Atwater factors)
pub fn calories_from_macros(protein_g: f64, carbs_g: f64, fat_g: f64) -> f64 {
    4.0 * protein_g + 4.0 * carbs_g + 9.0 * fat_g
}

// ============================================================================
// Macro Targets
// ============================================================================

/// Daily energy and macro targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Share of target calories that comes from fat
const FAT_CALORIE_SHARE: f64 = 0.25;

/// Calculate daily targets for a profile and goal
///
/// Calories are TDEE plus the goal adjustment, floored at
/// [`MIN_DAILY_CALORIES`]. Protein is set per kg of body weight, fat takes
/// 25% of calories and carbs fill whatever remains.
pub fn calculate_macro_targets(profile: &HealthProfile, goal: FitnessGoal) -> MacroTargets {
    let bmr = calculate_bmr_mifflin(profile.weight_kg, profile.height_cm, profile.age_years, profile.sex);
    let tdee = bmr * profile.activity_level.multiplier();
    let calories = (tdee + goal.calorie_adjustment()).max(MIN_DAILY_CALORIES);

    let protein_g = goal.protein_per_kg() * profile.weight_kg;
    let fat_g = calories * FAT_CALORIE_SHARE / 9.0;
    let remaining = calories - calories_from_macros(protein_g, 0.0, fat_g);
    let carbs_g = (remaining / 4.0).max(0.0);

    MacroTargets {
        bmr,
        tdee,
        calories,
        protein_g,
        carbs_g,
        fat_g,
    }
}

/// Round to one decimal place for presentation
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
