//! Daily food tracking against the profile targets

use super::nutrition::{parse_meal_type, NutritionService};
use super::profile::ProfileService;
use crate::error::ApiError;
use crate::repositories::{to_decimal, to_f64, CreateTrackingEntry, MealPlanRepository, TrackingRecord, TrackingRepository};
use chrono::NaiveDate;
use gymtrack_shared::types::{CreateTrackingEntryRequest, DailyTrackingResponse, TrackingEntryResponse};
use gymtrack_shared::validation::{validate_calories, validate_macro_grams, validate_name};
use gymtrack_shared::{calories_from_macros, MacroTotals};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Tracking service
pub struct TrackingService;

fn entry_macros(record: &TrackingRecord) -> MacroTotals {
    MacroTotals::new(
        to_f64(record.calories),
        to_f64(record.protein_g),
        to_f64(record.carbs_g),
        to_f64(record.fat_g),
    )
}

fn to_entry_response(record: TrackingRecord) -> TrackingEntryResponse {
    TrackingEntryResponse {
        macros: entry_macros(&record),
        id: record.id.to_string(),
        date: record.tracking_date,
        meal_type: record.meal_type,
        description: record.description,
        meal_plan_item_id: record.meal_plan_item_id.map(|id| id.to_string()),
        created_at: record.created_at,
    }
}

/// Day summary from its entries and optional targets
pub(crate) fn summarize_day(
    date: NaiveDate,
    records: Vec<TrackingRecord>,
    targets: Option<MacroTotals>,
) -> DailyTrackingResponse {
    let totals = records.iter().map(entry_macros).sum::<MacroTotals>().rounded();
    let remaining = targets.map(|t| totals.remaining_from(&t).rounded());

    DailyTrackingResponse {
        date,
        entries: records.into_iter().map(to_entry_response).collect(),
        totals,
        targets,
        remaining,
    }
}

/// Macros of a free entry; calories come from the macros when omitted
fn free_entry_macros(req: &CreateTrackingEntryRequest) -> Result<MacroTotals, ApiError> {
    validate_macro_grams("Protein", req.protein_g).map_err(ApiError::Validation)?;
    validate_macro_grams("Carbs", req.carbs_g).map_err(ApiError::Validation)?;
    validate_macro_grams("Fat", req.fat_g).map_err(ApiError::Validation)?;

    let calories = match req.calories {
        Some(calories) => {
            validate_calories(calories).map_err(ApiError::Validation)?;
            calories
        }
        None => calories_from_macros(req.protein_g, req.carbs_g, req.fat_g),
    };

    Ok(MacroTotals::new(calories, req.protein_g, req.carbs_g, req.fat_g))
}

impl TrackingService {
    /// Record a free-form entry
    pub async fn create_entry(
        db: &PgPool,
        user_id: Uuid,
        today: NaiveDate,
        req: CreateTrackingEntryRequest,
    ) -> Result<TrackingEntryResponse, ApiError> {
        let meal_type = parse_meal_type(&req.meal_type)?;
        validate_name("Description", &req.description).map_err(ApiError::Validation)?;
        let macros = free_entry_macros(&req)?;

        let record = TrackingRepository::create(
            db,
            user_id,
            CreateTrackingEntry {
                tracking_date: req.date.unwrap_or(today),
                meal_type: meal_type.as_str().to_string(),
                description: req.description.trim().to_string(),
                meal_plan_item_id: None,
                calories: to_decimal(macros.calories),
                protein_g: to_decimal(macros.protein_g),
                carbs_g: to_decimal(macros.carbs_g),
                fat_g: to_decimal(macros.fat_g),
            },
        )
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Free tracking entry was not inserted")))?;

        Ok(to_entry_response(record))
    }

    /// Mark a planned meal as eaten on its plan date
    ///
    /// Macros are copied from the meal at this moment; later edits to the
    /// meal do not change what was tracked. Each item can be recorded once.
    pub async fn track_plan_item(db: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<TrackingEntryResponse, ApiError> {
        let item = MealPlanRepository::find_item(db, user_id, item_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Meal plan item not found".to_string()))?;

        let macros = NutritionService::meal_totals(db, item.meal_id).await?;

        let record = TrackingRepository::create(
            db,
            user_id,
            CreateTrackingEntry {
                tracking_date: item.plan_date,
                meal_type: item.meal_type,
                description: item.meal_name,
                meal_plan_item_id: Some(item.id),
                calories: to_decimal(macros.calories),
                protein_g: to_decimal(macros.protein_g),
                carbs_g: to_decimal(macros.carbs_g),
                fat_g: to_decimal(macros.fat_g),
            },
        )
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Conflict("This planned meal was already tracked".to_string()))?;

        debug!(user_id = %user_id, item_id = %item_id, "Planned meal tracked");
        Ok(to_entry_response(record))
    }

    /// Entries, totals, targets and what remains for a day
    pub async fn daily(db: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<DailyTrackingResponse, ApiError> {
        let records = TrackingRepository::get_by_date(db, user_id, date)
            .await
            .map_err(ApiError::Internal)?;
        let targets = ProfileService::targets(db, user_id).await?;

        Ok(summarize_day(date, records, targets))
    }

    pub async fn delete_entry(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let deleted = TrackingRepository::delete(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Tracking entry not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn request(calories: Option<f64>) -> CreateTrackingEntryRequest {
        CreateTrackingEntryRequest {
            date: None,
            meal_type: "desayuno".to_string(),
            description: "Tostadas".to_string(),
            calories,
            protein_g: 10.0,
            carbs_g: 40.0,
            fat_g: 5.0,
        }
    }

    fn record(calories: i64) -> TrackingRecord {
        TrackingRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tracking_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            meal_type: "lunch".to_string(),
            description: "Ensalada".to_string(),
            meal_plan_item_id: None,
            calories: Decimal::new(calories, 0),
            protein_g: Decimal::new(20, 0),
            carbs_g: Decimal::new(30, 0),
            fat_g: Decimal::new(10, 0),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_calories_computed_from_macros() {
        let macros = free_entry_macros(&request(None)).unwrap();
        assert_eq!(macros.calories, 245.0);
    }

    #[test]
    fn test_explicit_calories_win() {
        let macros = free_entry_macros(&request(Some(300.0))).unwrap();
        assert_eq!(macros.calories, 300.0);
    }

    #[test]
    fn test_negative_macros_rejected() {
        let mut req = request(None);
        req.fat_g = -1.0;
        assert!(matches!(free_entry_macros(&req), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_summarize_day_with_targets() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let targets = MacroTotals::new(2000.0, 150.0, 200.0, 60.0);
        let day = summarize_day(date, vec![record(400), record(600)], Some(targets));

        assert_eq!(day.entries.len(), 2);
        assert_eq!(day.totals, MacroTotals::new(1000.0, 40.0, 60.0, 20.0));
        assert_eq!(day.remaining, Some(MacroTotals::new(1000.0, 110.0, 140.0, 40.0)));
    }

    #[test]
    fn test_summarize_day_without_profile() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let day = summarize_day(date, Vec::new(), None);
        assert_eq!(day.totals, MacroTotals::default());
        assert!(day.targets.is_none());
        assert!(day.remaining.is_none());
    }
}
