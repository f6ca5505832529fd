//! Domain enums shared by the backend and the Telegram bot

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Snack,
        MealType::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Snack => "snack",
            MealType::Dinner => "dinner",
        }
    }

    /// Parse English or Spanish meal names
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "breakfast" | "desayuno" => Some(MealType::Breakfast),
            "lunch" | "almuerzo" | "comida" => Some(MealType::Lunch),
            "snack" | "merienda" | "colacion" => Some(MealType::Snack),
            "dinner" | "cena" => Some(MealType::Dinner),
            _ => None,
        }
    }

    /// Position of the slot within a day, used for ordering
    pub fn order(&self) -> u8 {
        match self {
            MealType::Breakfast => 0,
            MealType::Lunch => 1,
            MealType::Snack => 2,
            MealType::Dinner => 3,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category a chat message is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Exercise,
    Nutrition,
    Progress,
    Routine,
    General,
}

impl Intent {
    /// Declaration order doubles as tie-break order for keyword scoring
    pub const ALL: [Intent; 5] = [
        Intent::Exercise,
        Intent::Nutrition,
        Intent::Progress,
        Intent::Routine,
        Intent::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Exercise => "exercise",
            Intent::Nutrition => "nutrition",
            Intent::Progress => "progress",
            Intent::Routine => "routine",
            Intent::General => "general",
        }
    }

    /// Parse a label produced by the classifier (English or Spanish)
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "exercise" | "ejercicio" | "ejercicios" | "workout" | "entrenamiento" => {
                Some(Intent::Exercise)
            }
            "nutrition" | "nutricion" | "nutrición" | "diet" | "dieta" => Some(Intent::Nutrition),
            "progress" | "progreso" => Some(Intent::Progress),
            "routine" | "rutina" => Some(Intent::Routine),
            "general" | "other" | "otro" => Some(Intent::General),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a stored chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// ISO weekday number of a date: 1 = Monday .. 7 = Sunday
pub fn iso_weekday(date: NaiveDate) -> i16 {
    date.weekday().number_from_monday() as i16
}

/// Spanish day name for an ISO weekday number
pub fn weekday_name_es(day_of_week: i16) -> &'static str {
    match day_of_week {
        1 => "Lunes",
        2 => "Martes",
        3 => "Miércoles",
        4 => "Jueves",
        5 => "Viernes",
        6 => "Sábado",
        7 => "Domingo",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("breakfast", Some(MealType::Breakfast))]
    #[case("Desayuno", Some(MealType::Breakfast))]
    #[case("comida", Some(MealType::Lunch))]
    #[case(" cena ", Some(MealType::Dinner))]
    #[case("merienda", Some(MealType::Snack))]
    #[case("brunch", None)]
    fn test_meal_type_parse(#[case] input: &str, #[case] expected: Option<MealType>) {
        assert_eq!(MealType::parse(input), expected);
    }

    #[rstest]
    #[case("exercise", Some(Intent::Exercise))]
    #[case("Rutina", Some(Intent::Routine))]
    #[case("nutrición", Some(Intent::Nutrition))]
    #[case("PROGRESO", Some(Intent::Progress))]
    #[case("weather", None)]
    fn test_intent_parse(#[case] input: &str, #[case] expected: Option<Intent>) {
        assert_eq!(Intent::parse(input), expected);
    }

    #[test]
    fn test_intent_serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Intent::Routine).unwrap();
        assert_eq!(json, "\"routine\"");
    }

    #[test]
    fn test_meal_order_is_chronological() {
        let mut meals = vec![MealType::Dinner, MealType::Breakfast, MealType::Snack, MealType::Lunch];
        meals.sort_by_key(|m| m.order());
        assert_eq!(meals, MealType::ALL.to_vec());
    }

    #[test]
    fn test_iso_weekday() {
        // 2024-01-01 was a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(iso_weekday(monday), 1);
        assert_eq!(iso_weekday(monday + chrono::Duration::days(6)), 7);
        assert_eq!(weekday_name_es(3), "Miércoles");
    }
}
