//! HTTP client for the backend bot routes

use crate::config::BotConfig;
use gymtrack_shared::types::{
    BotLinkRequest, BotLinkResponse, ChatRequest, ChatResponse, ExerciseHistoryResponse,
    RoutineResponse, TodayRoutineResponse,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const BOT_TOKEN_HEADER: &str = "X-Bot-Token";

/// Errors from the backend client
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("account not linked")]
    NotLinked,

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("bot token rejected by the backend")]
    Unauthorized,

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for `/api/v1/bot`
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl BackendClient {
    pub fn new(config: &BotConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/api/v1/bot", config.api_base_url.trim_end_matches('/')),
            bot_token: config.bot_api_token.clone(),
        })
    }

    fn user_url(&self, telegram_id: i64, path: &str) -> String {
        format!("{}/users/{}/{}", self.base_url, telegram_id, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiClientError> {
        let response = request.header(BOT_TOKEN_HEADER, &self.bot_token).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Backend response");

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(match status {
            StatusCode::NOT_FOUND => ApiClientError::NotLinked,
            StatusCode::BAD_REQUEST => ApiClientError::Rejected(message),
            StatusCode::CONFLICT => ApiClientError::Conflict(message),
            StatusCode::UNAUTHORIZED => ApiClientError::Unauthorized,
            _ => ApiClientError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Bind a Telegram account with a link code
    pub async fn link(
        &self,
        code: &str,
        telegram_id: i64,
        telegram_username: Option<String>,
    ) -> Result<BotLinkResponse, ApiClientError> {
        let body = BotLinkRequest {
            code: code.to_string(),
            telegram_id,
            telegram_username,
        };
        self.send(self.client.post(format!("{}/link", self.base_url)).json(&body))
            .await
    }

    pub async fn recent_logs(&self, telegram_id: i64) -> Result<ExerciseHistoryResponse, ApiClientError> {
        self.send(self.client.get(self.user_url(telegram_id, "logs"))).await
    }

    pub async fn routine(&self, telegram_id: i64) -> Result<RoutineResponse, ApiClientError> {
        self.send(self.client.get(self.user_url(telegram_id, "routine"))).await
    }

    pub async fn today(&self, telegram_id: i64) -> Result<TodayRoutineResponse, ApiClientError> {
        self.send(self.client.get(self.user_url(telegram_id, "today"))).await
    }

    pub async fn chat(&self, telegram_id: i64, message: &str) -> Result<ChatResponse, ApiClientError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        self.send(self.client.post(self.user_url(telegram_id, "chat")).json(&body))
            .await
    }
}
