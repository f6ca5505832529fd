//! Input validation functions
//!
//! Every validator returns `Err(message)` with a user-facing message; the
//! backend wraps it into a 400 response.

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a display name (meal, plan, ingredient, exercise)
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if trimmed.chars().count() > 120 {
        return Err(format!("{} must be at most 120 characters", field));
    }
    Ok(())
}

fn ensure_finite(field: &str, value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err(format!("{} must be a valid number", field));
    }
    Ok(())
}

/// Validate number of sets in a log or routine entry
pub fn validate_sets(sets: i32) -> Result<(), String> {
    if !(1..=100).contains(&sets) {
        return Err("Sets must be between 1 and 100".to_string());
    }
    Ok(())
}

/// Validate repetitions per set
pub fn validate_reps(reps: i32) -> Result<(), String> {
    if !(1..=1000).contains(&reps) {
        return Err("Reps must be between 1 and 1000".to_string());
    }
    Ok(())
}

/// Validate a lifted weight (in kg); zero is allowed for bodyweight work
pub fn validate_lift_weight(weight_kg: f64) -> Result<(), String> {
    ensure_finite("Weight", weight_kg)?;
    if !(0.0..=1000.0).contains(&weight_kg) {
        return Err("Weight must be between 0 and 1000 kg".to_string());
    }
    Ok(())
}

/// Validate body weight (in kg)
pub fn validate_body_weight(weight_kg: f64) -> Result<(), String> {
    ensure_finite("Weight", weight_kg)?;
    if !(20.0..=500.0).contains(&weight_kg) {
        return Err("Weight must be between 20 and 500 kg".to_string());
    }
    Ok(())
}

/// Validate height (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    ensure_finite("Height", height_cm)?;
    if !(50.0..=300.0).contains(&height_cm) {
        return Err("Height must be between 50 and 300 cm".to_string());
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age_years: i32) -> Result<(), String> {
    if !(10..=120).contains(&age_years) {
        return Err("Age must be between 10 and 120 years".to_string());
    }
    Ok(())
}

/// Validate duration in minutes
pub fn validate_duration_minutes(minutes: i32) -> Result<(), String> {
    if minutes < 0 {
        return Err("Duration cannot be negative".to_string());
    }
    if minutes > 1440 {
        return Err("Duration cannot exceed 24 hours".to_string());
    }
    Ok(())
}

/// Validate per-100g nutrition values of an ingredient
pub fn validate_per_100g(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Result<(), String> {
    ensure_finite("Calories", calories)?;
    if !(0.0..=900.0).contains(&calories) {
        return Err("Calories per 100g must be between 0 and 900".to_string());
    }
    for (name, value) in [("Protein", protein_g), ("Carbs", carbs_g), ("Fat", fat_g)] {
        ensure_finite(name, value)?;
        if !(0.0..=100.0).contains(&value) {
            return Err(format!("{} per 100g must be between 0 and 100 g", name));
        }
    }
    if protein_g + carbs_g + fat_g > 100.0 {
        return Err("Macros per 100g cannot add up to more than 100 g".to_string());
    }
    Ok(())
}

/// Validate a quantity of an ingredient in grams
pub fn validate_quantity_g(quantity_g: f64) -> Result<(), String> {
    ensure_finite("Quantity", quantity_g)?;
    if quantity_g <= 0.0 || quantity_g > 5000.0 {
        return Err("Quantity must be greater than 0 and at most 5000 g".to_string());
    }
    Ok(())
}

/// Validate a macro amount logged for a day (grams)
pub fn validate_macro_grams(field: &str, grams: f64) -> Result<(), String> {
    ensure_finite(field, grams)?;
    if !(0.0..=2000.0).contains(&grams) {
        return Err(format!("{} must be between 0 and 2000 g", field));
    }
    Ok(())
}

/// Validate calorie value
pub fn validate_calories(calories: f64) -> Result<(), String> {
    ensure_finite("Calories", calories)?;
    if calories < 0.0 {
        return Err("Calories cannot be negative".to_string());
    }
    if calories > 20000.0 {
        return Err("Calorie value unreasonably high".to_string());
    }
    Ok(())
}

/// Validate ISO day of week (1 = Monday .. 7 = Sunday)
pub fn validate_day_of_week(day: i16) -> Result<(), String> {
    if !(1..=7).contains(&day) {
        return Err("Day of week must be between 1 (Monday) and 7 (Sunday)".to_string());
    }
    Ok(())
}

/// Maximum chat message length accepted by the chatbot
pub const MAX_CHAT_MESSAGE_CHARS: usize = 2000;

/// Validate a chatbot message
pub fn validate_chat_message(message: &str) -> Result<(), String> {
    if message.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    if message.chars().count() > MAX_CHAT_MESSAGE_CHARS {
        return Err(format!(
            "Message must be at most {} characters",
            MAX_CHAT_MESSAGE_CHARS
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(100, true)]
    #[case(101, false)]
    fn test_validate_sets(#[case] sets: i32, #[case] ok: bool) {
        assert_eq!(validate_sets(sets).is_ok(), ok);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(7, true)]
    #[case(8, false)]
    fn test_validate_day_of_week(#[case] day: i16, #[case] ok: bool) {
        assert_eq!(validate_day_of_week(day).is_ok(), ok);
    }

    #[test]
    fn test_validate_per_100g() {
        // Chicken breast
        assert!(validate_per_100g(165.0, 31.0, 0.0, 3.6).is_ok());
        assert!(validate_per_100g(950.0, 0.0, 0.0, 100.0).is_err());
        assert!(validate_per_100g(300.0, 60.0, 60.0, 0.0).is_err());
        assert!(validate_per_100g(f64::NAN, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_validate_name_trims() {
        assert!(validate_name("Meal name", "   ").is_err());
        assert!(validate_name("Meal name", " Avena ").is_ok());
        assert!(validate_name("Meal name", &"x".repeat(121)).is_err());
    }

    #[test]
    fn test_validate_chat_message() {
        assert!(validate_chat_message("¿Qué entreno hoy?").is_ok());
        assert!(validate_chat_message("  ").is_err());
        assert!(validate_chat_message(&"a".repeat(MAX_CHAT_MESSAGE_CHARS + 1)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_lift_weight_in_range_is_valid(weight in 0.0f64..=1000.0) {
            prop_assert!(validate_lift_weight(weight).is_ok());
        }

        #[test]
        fn prop_quantity_positive_is_valid(quantity in 0.1f64..5000.0) {
            prop_assert!(validate_quantity_g(quantity).is_ok());
        }

        #[test]
        fn prop_negative_quantity_is_invalid(quantity in -5000.0f64..=0.0) {
            prop_assert!(validate_quantity_g(quantity).is_err());
        }
    }
}
