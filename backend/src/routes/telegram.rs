//! Telegram linking routes for web users

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::TelegramService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use gymtrack_shared::types::LinkCodeResponse;

/// Create telegram routes
pub fn telegram_routes() -> Router<AppState> {
    Router::new().route("/link-code", post(create_link_code))
}

/// POST /api/v1/telegram/link-code - Code to send to the bot with /vincular
async fn create_link_code(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<LinkCodeResponse>, ApiError> {
    let ttl = state.config().telegram.link_code_ttl_secs;
    let code = TelegramService::create_link_code(state.db(), auth.user_id, ttl).await?;
    Ok(Json(code))
}
