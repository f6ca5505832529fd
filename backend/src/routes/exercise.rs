//! Exercise log API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::nutrition::parse_id;
use crate::services::ExerciseService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use gymtrack_shared::types::{
    ExerciseHistoryQuery, ExerciseHistoryResponse, ExerciseLogResponse, ExerciseProgressQuery,
    ExerciseProgressResponse, LogExerciseRequest, UpdateExerciseLogRequest,
};

/// Create exercise routes
pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(get_history).post(log_exercise))
        .route("/logs/export", get(export_csv))
        .route("/logs/:id", get(get_log).put(update_log).delete(delete_log))
        .route("/progress", get(get_progress))
}

/// POST /api/v1/exercise/logs - Log an exercise
async fn log_exercise(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogExerciseRequest>,
) -> Result<Json<ExerciseLogResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let log = ExerciseService::log(state.db(), auth.user_id, today, req).await?;
    Ok(Json(log))
}

/// GET /api/v1/exercise/logs?start&end&limit&offset - Paginated history, newest first
async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExerciseHistoryQuery>,
) -> Result<Json<ExerciseHistoryResponse>, ApiError> {
    let history = ExerciseService::history(state.db(), auth.user_id, query).await?;
    Ok(Json(history))
}

/// GET /api/v1/exercise/logs/:id
async fn get_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ExerciseLogResponse>, ApiError> {
    let id = parse_id("exercise log ID", &id)?;
    let log = ExerciseService::get(state.db(), auth.user_id, id).await?;
    Ok(Json(log))
}

/// PUT /api/v1/exercise/logs/:id
async fn update_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateExerciseLogRequest>,
) -> Result<Json<ExerciseLogResponse>, ApiError> {
    let id = parse_id("exercise log ID", &id)?;
    let log = ExerciseService::update(state.db(), auth.user_id, id, req).await?;
    Ok(Json(log))
}

/// DELETE /api/v1/exercise/logs/:id
async fn delete_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id("exercise log ID", &id)?;
    ExerciseService::delete(state.db(), auth.user_id, id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// GET /api/v1/exercise/logs/export - All logs as a CSV attachment
async fn export_csv(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let csv = ExerciseService::export_csv(state.db(), auth.user_id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"exercise-logs.csv\""),
    );

    Ok((headers, csv))
}

/// GET /api/v1/exercise/progress?exercise&days - Per-day max weight and volume
async fn get_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExerciseProgressQuery>,
) -> Result<Json<ExerciseProgressResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let progress = ExerciseService::progress(state.db(), auth.user_id, today, query).await?;
    Ok(Json(progress))
}
