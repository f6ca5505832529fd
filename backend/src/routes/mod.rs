//! Route definitions for the GymTrack API
//!
//! This module organizes all API routes and applies middleware.

use crate::auth::BOT_TOKEN_HEADER;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, Method},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod bot;
mod chatbot;
mod dashboard;
mod exercise;
mod health;
mod meal_plans;
mod nutrition;
mod profile;
mod routine;
mod telegram;
mod tracking;

#[cfg(test)]
mod auth_tests;

pub use auth::auth_routes;
pub use bot::bot_routes;
pub use chatbot::chatbot_routes;
pub use exercise::exercise_routes;
pub use meal_plans::meal_plan_routes;
pub use nutrition::nutrition_routes;
pub use profile::profile_routes;
pub use routine::routine_routes;
pub use telegram::telegram_routes;
pub use tracking::tracking_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .route("/dashboard", get(dashboard::browser_dashboard))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    HeaderName::from_static(BOT_TOKEN_HEADER),
                ]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "GymTrack API v1" }))
        .route("/dashboard", get(dashboard::get_dashboard))
        .nest("/auth", auth::auth_routes())
        .nest("/profile", profile::profile_routes())
        .nest("/nutrition", nutrition::nutrition_routes())
        .nest("/meal-plans", meal_plans::meal_plan_routes())
        .nest("/tracking", tracking::tracking_routes())
        .nest("/exercise", exercise::exercise_routes())
        .nest("/routine", routine::routine_routes())
        .nest("/chatbot", chatbot::chatbot_routes())
        .nest("/telegram", telegram::telegram_routes())
        .nest("/bot", bot::bot_routes())
}

/// Parse a `YYYY-MM-DD` path segment
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}
