//! Nutrition profile: body data plus the energy targets derived from it

use crate::error::ApiError;
use crate::repositories::{to_decimal, to_f64, ProfileRecord, ProfileRepository, UpsertProfile};
use gymtrack_shared::types::{NutritionProfileResponse, UpsertProfileRequest};
use gymtrack_shared::validation::{validate_age, validate_body_weight, validate_height_cm};
use gymtrack_shared::{
    calculate_macro_targets, round1, ActivityLevel, BiologicalSex, FitnessGoal, HealthProfile, MacroTotals,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Profile service
pub struct ProfileService;

impl ProfileService {
    /// GET the profile; 404 until the user has created one
    pub async fn get(db: &PgPool, user_id: Uuid) -> Result<NutritionProfileResponse, ApiError> {
        let record = ProfileRepository::get(db, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Nutrition profile not found".to_string()))?;

        Ok(to_response(record))
    }

    /// Validate, compute targets and store
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        req: UpsertProfileRequest,
    ) -> Result<NutritionProfileResponse, ApiError> {
        let input = build_profile(&req)?;
        let record = ProfileRepository::upsert(db, user_id, input)
            .await
            .map_err(ApiError::Internal)?;

        Ok(to_response(record))
    }

    /// Daily targets of a user, if a profile exists
    pub async fn targets(db: &PgPool, user_id: Uuid) -> Result<Option<MacroTotals>, ApiError> {
        let record = ProfileRepository::get(db, user_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(record.as_ref().map(targets_of))
    }
}

fn targets_of(record: &ProfileRecord) -> MacroTotals {
    MacroTotals::new(
        to_f64(record.target_calories),
        to_f64(record.target_protein_g),
        to_f64(record.target_carbs_g),
        to_f64(record.target_fat_g),
    )
}

/// Turn a request into a row with computed BMR, TDEE and targets
fn build_profile(req: &UpsertProfileRequest) -> Result<UpsertProfile, ApiError> {
    let sex = BiologicalSex::parse(&req.sex)
        .ok_or_else(|| ApiError::Validation("Sex must be 'male' or 'female'".to_string()))?;
    let activity_level = ActivityLevel::parse(&req.activity_level).ok_or_else(|| {
        ApiError::Validation(
            "Activity level must be one of: sedentary, lightly_active, moderately_active, very_active, extra_active"
                .to_string(),
        )
    })?;
    let goal = match req.goal.as_deref() {
        Some(goal) => FitnessGoal::parse(goal).ok_or_else(|| {
            ApiError::Validation("Goal must be one of: lose_weight, maintain, gain_muscle".to_string())
        })?,
        None => FitnessGoal::Maintain,
    };
    validate_age(req.age_years).map_err(ApiError::Validation)?;
    validate_height_cm(req.height_cm).map_err(ApiError::Validation)?;
    validate_body_weight(req.weight_kg).map_err(ApiError::Validation)?;

    let profile = HealthProfile {
        height_cm: req.height_cm,
        weight_kg: req.weight_kg,
        age_years: req.age_years,
        sex,
        activity_level,
    };
    let targets = calculate_macro_targets(&profile, goal);

    Ok(UpsertProfile {
        sex: sex.as_str().to_string(),
        age_years: req.age_years,
        height_cm: to_decimal(req.height_cm),
        weight_kg: to_decimal(req.weight_kg),
        activity_level: activity_level.as_str().to_string(),
        goal: goal.as_str().to_string(),
        bmr: to_decimal(round1(targets.bmr)),
        tdee: to_decimal(round1(targets.tdee)),
        target_calories: to_decimal(round1(targets.calories)),
        target_protein_g: to_decimal(round1(targets.protein_g)),
        target_carbs_g: to_decimal(round1(targets.carbs_g)),
        target_fat_g: to_decimal(round1(targets.fat_g)),
    })
}

fn to_response(record: ProfileRecord) -> NutritionProfileResponse {
    let targets = targets_of(&record);
    NutritionProfileResponse {
        sex: record.sex,
        age_years: record.age_years,
        height_cm: to_f64(record.height_cm),
        weight_kg: to_f64(record.weight_kg),
        activity_level: record.activity_level,
        goal: record.goal,
        bmr: to_f64(record.bmr),
        tdee: to_f64(record.tdee),
        targets,
        updated_at: record.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn request() -> UpsertProfileRequest {
        UpsertProfileRequest {
            sex: "male".to_string(),
            age_years: 30,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity_level: "moderately_active".to_string(),
            goal: Some("gain_muscle".to_string()),
        }
    }

    #[test]
    fn test_build_profile_computes_targets() {
        let profile = build_profile(&request()).unwrap();
        // 10*80 + 6.25*180 - 5*30 + 5 = 1780
        assert_eq!(profile.bmr, Decimal::new(1780, 0));
        // 1780 * 1.55 = 2759
        assert_eq!(profile.tdee, Decimal::new(2759, 0));
        assert_eq!(profile.target_calories, Decimal::new(3059, 0));
        assert_eq!(profile.target_protein_g, Decimal::new(160, 0));
        assert_eq!(profile.goal, "gain_muscle");
    }

    #[test]
    fn test_goal_defaults_to_maintain() {
        let mut req = request();
        req.goal = None;
        let profile = build_profile(&req).unwrap();
        assert_eq!(profile.goal, "maintain");
        assert_eq!(profile.target_calories, profile.tdee);
    }

    #[rstest]
    #[case("sex", "robot")]
    #[case("activity_level", "couch")]
    #[case("goal", "fly")]
    #[case("age_years", "5")]
    #[case("height_cm", "20")]
    #[case("weight_kg", "900")]
    fn test_build_profile_rejects(#[case] field: &str, #[case] value: &str) {
        let mut req = request();
        match field {
            "sex" => req.sex = value.to_string(),
            "activity_level" => req.activity_level = value.to_string(),
            "goal" => req.goal = Some(value.to_string()),
            "age_years" => req.age_years = value.parse().unwrap(),
            "height_cm" => req.height_cm = value.parse().unwrap(),
            "weight_kg" => req.weight_kg = value.parse().unwrap(),
            _ => unreachable!(),
        }
        assert!(matches!(build_profile(&req), Err(ApiError::Validation(_))));
    }
}
