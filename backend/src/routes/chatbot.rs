//! Chatbot routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::ChatbotService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use gymtrack_shared::types::{ChatHistoryResponse, ChatRequest, ChatResponse};

/// Create chatbot routes
pub fn chatbot_routes() -> Router<AppState> {
    Router::new()
        .route("/message", post(send_message))
        .route("/history", get(get_history).delete(clear_history))
}

/// POST /api/v1/chatbot/message - Ask the assistant
async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = ChatbotService::send_message(
        state.db(),
        &state.chatbot,
        state.config().ai.history_limit,
        auth.user_id,
        &req.message,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/chatbot/history - Latest messages, oldest first
async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let history = ChatbotService::history(state.db(), auth.user_id).await?;
    Ok(Json(history))
}

/// DELETE /api/v1/chatbot/history
async fn clear_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = ChatbotService::clear(state.db(), auth.user_id).await?;
    Ok(Json(serde_json::json!({"deleted": deleted})))
}
