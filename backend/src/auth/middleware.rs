//! Request extractors for authenticated users and the Telegram bot

use super::jwt::TokenKind;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use uuid::Uuid;

/// Cookie that carries the access token for browser sessions
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Header the bot uses to authenticate against `/api/v1/bot`
pub const BOT_TOKEN_HEADER: &str = "x-bot-token";

/// Authenticated user extracted from JWT
///
/// The token is read from `Authorization: Bearer <token>` first and from the
/// `access_token` cookie otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = match parts.headers.get(AUTHORIZATION) {
            Some(value) => {
                let header = value
                    .to_str()
                    .map_err(|_| ApiError::Unauthorized("Invalid authorization header".to_string()))?;
                header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?
                    .to_string()
            }
            None => token_from_cookie(parts)
                .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?,
        };

        let claims = app_state
            .jwt()
            .validate(&token, TokenKind::Access)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        let user_id = claims
            .user_id()
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        Ok(AuthUser { user_id })
    }
}

fn token_from_cookie(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Marker proving the request came from the Telegram bot process
#[derive(Debug, Clone, Copy)]
pub struct BotAuth;

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for BotAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let expected = &app_state.config().telegram.bot_api_token;

        let provided = parts
            .headers
            .get(BOT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing bot token".to_string()))?;

        if expected.is_empty() || provided != expected {
            return Err(ApiError::Unauthorized("Invalid bot token".to_string()));
        }

        Ok(BotAuth)
    }
}
