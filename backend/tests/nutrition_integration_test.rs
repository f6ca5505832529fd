//! Integration tests for ingredients, meals, meal plans and tracking

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

async fn create_oats(app: &common::TestApp, token: &str) -> String {
    let (status, ingredient) = app
        .post(
            "/api/v1/nutrition/ingredients",
            token,
            json!({
                "name": "Avena",
                "calories_per_100g": 389.0,
                "protein_per_100g": 16.9,
                "carbs_per_100g": 66.3,
                "fat_per_100g": 6.9
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", ingredient);
    ingredient["id"].as_str().unwrap().to_string()
}

async fn create_breakfast(app: &common::TestApp, token: &str, oats: &str) -> Value {
    let (status, meal) = app
        .post(
            "/api/v1/nutrition/meals",
            token,
            json!({
                "name": "Porridge",
                "meal_type": "desayuno",
                "ingredients": [{"ingredient_id": oats, "quantity_g": 50.0}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", meal);
    meal
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_meal_totals_follow_ingredient_quantities() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;
    let oats = create_oats(&app, &token).await;

    let meal = create_breakfast(&app, &token, &oats).await;
    assert_eq!(meal["meal"]["meal_type"], "breakfast");
    assert_eq!(meal["totals"]["calories"], 194.5);

    let meal_id = meal["meal"]["id"].as_str().unwrap();
    let (status, updated) = app
        .put(
            &format!("/api/v1/nutrition/meals/{}/ingredients/{}", meal_id, oats),
            &token,
            json!({"quantity_g": 100.0}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["totals"]["calories"], 389.0);

    let (status, removed) = app
        .delete(&format!("/api/v1/nutrition/meals/{}/ingredients/{}", meal_id, oats), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["ingredients"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_ingredient_in_use_cannot_be_deleted() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;
    let oats = create_oats(&app, &token).await;
    create_breakfast(&app, &token, &oats).await;

    let (status, _) = app.delete(&format!("/api/v1/nutrition/ingredients/{}", oats), &token).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_ingredients_are_private() {
    let app = common::TestApp::new().await;
    let owner = app.register_user().await;
    let other = app.register_user().await;
    let oats = create_oats(&app, &owner).await;

    let (status, _) = app.get(&format!("/api/v1/nutrition/ingredients/{}", oats), &other).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, found) = app.get("/api/v1/nutrition/ingredients?q=aven", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().iter().any(|i| i["id"] == oats.as_str()));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_ingredient_search_treats_wildcards_literally() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;

    let (status, found) = app.get("/api/v1/nutrition/ingredients?q=_", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().is_empty(), "{}", found);

    let (status, found) = app.get("/api/v1/nutrition/ingredients?q=%25", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().is_empty(), "{}", found);

    let (status, found) = app.get("/api/v1/nutrition/ingredients?q=POLLO", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["name"], "Pechuga de pollo");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_plan_item_tracking_is_recorded_once() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;
    let oats = create_oats(&app, &token).await;
    let meal = create_breakfast(&app, &token, &oats).await;

    let (status, plan) = app
        .post(
            "/api/v1/meal-plans",
            &token,
            json!({"name": "Semana 1", "start_date": "2024-03-04", "end_date": "2024-03-10"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", plan);
    let plan_id = plan["id"].as_str().unwrap();

    // outside the plan range
    let (status, _) = app
        .post(
            &format!("/api/v1/meal-plans/{}/items", plan_id),
            &token,
            json!({"meal_id": meal["meal"]["id"], "plan_date": "2024-03-11"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, item) = app
        .post(
            &format!("/api/v1/meal-plans/{}/items", plan_id),
            &token,
            json!({"meal_id": meal["meal"]["id"], "plan_date": "2024-03-05"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", item);
    assert_eq!(item["meal_type"], "breakfast");

    let (status, day) = app
        .get(&format!("/api/v1/meal-plans/{}/days/2024-03-05", plan_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["items"].as_array().unwrap().len(), 1);

    let item_path = format!("/api/v1/tracking/plan-items/{}", item["id"].as_str().unwrap());
    let (status, entry) = app.post(&item_path, &token, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", entry);
    assert_eq!(entry["date"], "2024-03-05");
    assert_eq!(entry["macros"]["calories"], 194.5);

    let (status, _) = app.post(&item_path, &token, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_free_tracking_entry_computes_calories() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;

    let (status, entry) = app
        .post(
            "/api/v1/tracking",
            &token,
            json!({
                "date": "2024-03-04",
                "meal_type": "lunch",
                "description": "Pollo con arroz",
                "protein_g": 30.0,
                "carbs_g": 10.0,
                "fat_g": 5.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", entry);
    assert_eq!(entry["macros"]["calories"], 205.0);

    let (status, day) = app.get("/api/v1/tracking/2024-03-04", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["totals"]["protein_g"], 30.0);
    assert!(day.get("targets").is_none());

    let entry_id = entry["id"].as_str().unwrap();
    let (status, _) = app.delete(&format!("/api/v1/tracking/entries/{}", entry_id), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/v1/tracking/entries/{}", entry_id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_only_one_meal_plan_is_active() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;
    let other = app.register_user().await;

    let (_, theirs) = app
        .post("/api/v1/meal-plans", &other, json!({"name": "Ajena", "start_date": "2024-03-04"}))
        .await;
    let (_, first) = app
        .post("/api/v1/meal-plans", &token, json!({"name": "Semana 1", "start_date": "2024-03-04"}))
        .await;
    let (status, second) = app
        .post("/api/v1/meal-plans", &token, json!({"name": "Semana 2", "start_date": "2024-03-11"}))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", second);

    let active = |plans: &Value| -> Vec<String> {
        plans
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["is_active"] == true)
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, plans) = app.get("/api/v1/meal-plans", &token).await;
    assert_eq!(active(&plans), vec!["Semana 2"]);

    let first_path = format!("/api/v1/meal-plans/{}", first["id"].as_str().unwrap());
    let (status, _) = app.put(&first_path, &token, json!({"is_active": true})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, plans) = app.get("/api/v1/meal-plans", &token).await;
    assert_eq!(active(&plans), vec!["Semana 1"]);

    let (_, dashboard) = app.get("/api/v1/dashboard", &token).await;
    assert_eq!(dashboard["active_meal_plan"]["name"], "Semana 1");

    let (_, their_plans) = app.get("/api/v1/meal-plans", &other).await;
    assert_eq!(their_plans[0]["id"], theirs["id"]);
    assert_eq!(their_plans[0]["is_active"], true);
}
