//! Routes used by the Telegram bot
//!
//! Every handler requires the `X-Bot-Token` header. Users are addressed by
//! their Telegram id; ids that are not linked answer 404.

use crate::auth::BotAuth;
use crate::error::ApiError;
use crate::services::{ChatbotService, ExerciseService, RoutineService, TelegramService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use gymtrack_shared::types::{
    BotLinkRequest, BotLinkResponse, ChatRequest, ChatResponse, ExerciseHistoryQuery,
    ExerciseHistoryResponse, RoutineResponse, TodayRoutineResponse,
};

/// Logs returned by `/logs`
pub const BOT_LOG_LIMIT: i64 = 10;

/// Create bot routes
pub fn bot_routes() -> Router<AppState> {
    Router::new()
        .route("/link", post(link_account))
        .route("/users/:telegram_id/logs", get(recent_logs))
        .route("/users/:telegram_id/routine", get(weekly_routine))
        .route("/users/:telegram_id/today", get(today_routine))
        .route("/users/:telegram_id/chat", post(chat))
}

/// POST /api/v1/bot/link - Bind a Telegram id with a link code
async fn link_account(
    State(state): State<AppState>,
    _bot: BotAuth,
    Json(req): Json<BotLinkRequest>,
) -> Result<Json<BotLinkResponse>, ApiError> {
    let linked = TelegramService::link(state.db(), req).await?;
    Ok(Json(linked))
}

/// GET /api/v1/bot/users/:telegram_id/logs - Latest exercise logs
async fn recent_logs(
    State(state): State<AppState>,
    _bot: BotAuth,
    Path(telegram_id): Path<i64>,
) -> Result<Json<ExerciseHistoryResponse>, ApiError> {
    let user = TelegramService::user_by_telegram_id(state.db(), telegram_id).await?;
    let query = ExerciseHistoryQuery {
        limit: Some(BOT_LOG_LIMIT),
        ..Default::default()
    };
    let history = ExerciseService::history(state.db(), user.id, query).await?;
    Ok(Json(history))
}

/// GET /api/v1/bot/users/:telegram_id/routine
async fn weekly_routine(
    State(state): State<AppState>,
    _bot: BotAuth,
    Path(telegram_id): Path<i64>,
) -> Result<Json<RoutineResponse>, ApiError> {
    let user = TelegramService::user_by_telegram_id(state.db(), telegram_id).await?;
    let routine = RoutineService::get_week(state.db(), user.id).await?;
    Ok(Json(routine))
}

/// GET /api/v1/bot/users/:telegram_id/today
async fn today_routine(
    State(state): State<AppState>,
    _bot: BotAuth,
    Path(telegram_id): Path<i64>,
) -> Result<Json<TodayRoutineResponse>, ApiError> {
    let user = TelegramService::user_by_telegram_id(state.db(), telegram_id).await?;
    let today = RoutineService::for_date(state.db(), user.id, Utc::now().date_naive()).await?;
    Ok(Json(today))
}

/// POST /api/v1/bot/users/:telegram_id/chat - Ask the assistant on behalf of a user
async fn chat(
    State(state): State<AppState>,
    _bot: BotAuth,
    Path(telegram_id): Path<i64>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user = TelegramService::user_by_telegram_id(state.db(), telegram_id).await?;
    let response = ChatbotService::send_message(
        state.db(),
        &state.chatbot,
        state.config().ai.history_limit,
        user.id,
        &req.message,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(response))
}
