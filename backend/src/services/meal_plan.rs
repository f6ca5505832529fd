//! Meal plans and their scheduled meals

use super::nutrition::{parse_id, parse_meal_type, totals_by_meal};
use crate::error::ApiError;
use crate::repositories::{
    CreateMealPlan, CreateMealPlanItem, MealPlanItemRecord, MealPlanRecord, MealPlanRepository, MealRepository,
    UpdateMealPlan,
};
use chrono::NaiveDate;
use gymtrack_shared::types::{
    AddMealPlanItemRequest, CreateMealPlanRequest, MealPlanDayResponse, MealPlanDetailResponse,
    MealPlanItemResponse, MealPlanResponse, UpdateMealPlanRequest,
};
use gymtrack_shared::validation::validate_name;
use gymtrack_shared::{MacroTotals, MealType};
use sqlx::PgPool;
use uuid::Uuid;

/// Meal plan service
pub struct MealPlanService;

fn validate_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), ApiError> {
    match end {
        Some(end) if end < start => Err(ApiError::Validation(
            "end_date cannot be before start_date".to_string(),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn to_plan_response(record: MealPlanRecord) -> MealPlanResponse {
    MealPlanResponse {
        id: record.id.to_string(),
        name: record.name,
        start_date: record.start_date,
        end_date: record.end_date,
        is_active: record.is_active,
        created_at: record.created_at,
    }
}

/// Attach computed meal totals to plan items
async fn with_totals(db: &PgPool, items: Vec<MealPlanItemRecord>) -> Result<Vec<MealPlanItemResponse>, ApiError> {
    let mut meal_ids: Vec<Uuid> = items.iter().map(|i| i.meal_id).collect();
    meal_ids.sort();
    meal_ids.dedup();

    let rows = MealRepository::ingredients_for(db, &meal_ids)
        .await
        .map_err(ApiError::Internal)?;
    let totals = totals_by_meal(&rows);

    Ok(items
        .into_iter()
        .map(|item| MealPlanItemResponse {
            id: item.id.to_string(),
            meal_id: item.meal_id.to_string(),
            totals: totals.get(&item.meal_id).copied().unwrap_or_default().rounded(),
            meal_name: item.meal_name,
            plan_date: item.plan_date,
            meal_type: item.meal_type,
            notes: item.notes,
        })
        .collect())
}

/// Breakfast, lunch, snack, dinner; unknown types last
fn sort_by_meal_slot(items: &mut [MealPlanItemRecord]) {
    items.sort_by_key(|item| MealType::parse(&item.meal_type).map_or(u8::MAX, |t| t.order()));
}

impl MealPlanService {
    pub async fn create(db: &PgPool, user_id: Uuid, req: CreateMealPlanRequest) -> Result<MealPlanResponse, ApiError> {
        validate_name("Plan name", &req.name).map_err(ApiError::Validation)?;
        validate_range(req.start_date, req.end_date)?;

        let record = MealPlanRepository::create(
            db,
            user_id,
            CreateMealPlan {
                name: req.name.trim().to_string(),
                start_date: req.start_date,
                end_date: req.end_date,
                is_active: req.is_active,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(to_plan_response(record))
    }

    pub async fn list(db: &PgPool, user_id: Uuid) -> Result<Vec<MealPlanResponse>, ApiError> {
        let plans = MealPlanRepository::list(db, user_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(plans.into_iter().map(to_plan_response).collect())
    }

    pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<MealPlanDetailResponse, ApiError> {
        let plan = Self::owned_plan(db, user_id, id).await?;
        let items = MealPlanRepository::items(db, plan.id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(MealPlanDetailResponse {
            items: with_totals(db, items).await?,
            plan: to_plan_response(plan),
        })
    }

    /// The merged date range must stay valid
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        req: UpdateMealPlanRequest,
    ) -> Result<MealPlanResponse, ApiError> {
        if let Some(name) = &req.name {
            validate_name("Plan name", name).map_err(ApiError::Validation)?;
        }
        let current = Self::owned_plan(db, user_id, id).await?;
        validate_range(
            req.start_date.unwrap_or(current.start_date),
            req.end_date.or(current.end_date),
        )?;

        let record = MealPlanRepository::update(
            db,
            user_id,
            id,
            UpdateMealPlan {
                name: req.name.map(|n| n.trim().to_string()),
                start_date: req.start_date,
                end_date: req.end_date,
                is_active: req.is_active,
            },
        )
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Meal plan not found".to_string()))?;

        Ok(to_plan_response(record))
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let deleted = MealPlanRepository::delete(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Meal plan not found".to_string()));
        }
        Ok(())
    }

    /// Schedule one of the user's meals on a date inside the plan
    pub async fn add_item(
        db: &PgPool,
        user_id: Uuid,
        plan_id: Uuid,
        req: AddMealPlanItemRequest,
    ) -> Result<MealPlanItemResponse, ApiError> {
        let plan = Self::owned_plan(db, user_id, plan_id).await?;
        if !plan.covers(req.plan_date) {
            return Err(ApiError::Validation(format!(
                "{} is outside the plan's date range",
                req.plan_date
            )));
        }

        let meal_id = parse_id("meal_id", &req.meal_id)?;
        let meal = MealRepository::get(db, user_id, meal_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))?;

        let meal_type = match req.meal_type.as_deref() {
            Some(value) => parse_meal_type(value)?.as_str().to_string(),
            None => meal.meal_type,
        };

        let item = MealPlanRepository::add_item(
            db,
            plan.id,
            CreateMealPlanItem {
                meal_id,
                plan_date: req.plan_date,
                meal_type,
                notes: req.notes,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        with_totals(db, vec![item])
            .await?
            .pop()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Item vanished after insert")))
    }

    pub async fn remove_item(db: &PgPool, user_id: Uuid, plan_id: Uuid, item_id: Uuid) -> Result<(), ApiError> {
        let plan = Self::owned_plan(db, user_id, plan_id).await?;
        let removed = MealPlanRepository::remove_item(db, plan.id, item_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound("Meal plan item not found".to_string()));
        }
        Ok(())
    }

    /// Items of one day in meal order, with the day's totals
    pub async fn day(db: &PgPool, user_id: Uuid, plan_id: Uuid, date: NaiveDate) -> Result<MealPlanDayResponse, ApiError> {
        let plan = Self::owned_plan(db, user_id, plan_id).await?;
        let mut items = MealPlanRepository::items_on(db, plan.id, date)
            .await
            .map_err(ApiError::Internal)?;
        sort_by_meal_slot(&mut items);

        let items = with_totals(db, items).await?;
        let totals = items.iter().map(|i| i.totals).sum::<MacroTotals>().rounded();

        Ok(MealPlanDayResponse {
            plan_id: plan.id.to_string(),
            date,
            items,
            totals,
        })
    }

    async fn owned_plan(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<MealPlanRecord, ApiError> {
        MealPlanRepository::get(db, user_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Meal plan not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn item(meal_type: &str) -> MealPlanItemRecord {
        MealPlanItemRecord {
            id: Uuid::new_v4(),
            meal_plan_id: Uuid::new_v4(),
            meal_id: Uuid::new_v4(),
            meal_name: meal_type.to_string(),
            plan_date: date(4),
            meal_type: meal_type.to_string(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(date(4), None).is_ok());
        assert!(validate_range(date(4), Some(date(4))).is_ok());
        assert!(matches!(validate_range(date(4), Some(date(3))), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_items_sorted_by_meal_slot() {
        let mut items = vec![item("dinner"), item("breakfast"), item("snack"), item("lunch")];
        sort_by_meal_slot(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.meal_type.as_str()).collect();
        assert_eq!(order, ["breakfast", "lunch", "snack", "dinner"]);
    }
}
