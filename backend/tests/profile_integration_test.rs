//! Integration tests for the nutrition profile

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_missing_until_created() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;

    let (status, _) = app.get("/api/v1/profile", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_upsert_profile_computes_targets() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;

    let body = json!({
        "sex": "male",
        "age_years": 30,
        "height_cm": 180.0,
        "weight_kg": 80.0,
        "activity_level": "moderately_active",
        "goal": "lose"
    });
    let (status, profile) = app.put("/api/v1/profile", &token, body).await;
    assert_eq!(status, StatusCode::OK, "{}", profile);

    // Mifflin-St Jeor: 10*80 + 6.25*180 - 5*30 + 5
    assert_eq!(profile["bmr"], 1780.0);
    let tdee = profile["tdee"].as_f64().unwrap();
    let calories = profile["targets"]["calories"].as_f64().unwrap();
    assert!(calories < tdee);

    let (status, fetched) = app.get("/api/v1/profile", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["goal"], "lose_weight");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_upsert_profile_validates() {
    let app = common::TestApp::new().await;
    let token = app.register_user().await;

    let body = json!({
        "sex": "male",
        "age_years": 5,
        "height_cm": 180.0,
        "weight_kg": 80.0,
        "activity_level": "sedentary"
    });
    let (status, _) = app.put("/api/v1/profile", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
