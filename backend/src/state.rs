//! Application state shared by every handler
//!
//! Everything in here is built once at startup and is cheap to clone:
//! the pool and the chatbot are reference counted, and JWT keys are
//! derived up front.

use crate::auth::{GoogleVerifier, JwtService};
use crate::chatbot::{FitnessChatbot, LlmClient, OpenAiClient};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    pub google: GoogleVerifier,
    pub chatbot: Arc<FitnessChatbot>,
    /// Prometheus renderer; `/metrics` is disabled without it
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the state with the configured LLM client
    pub fn new(db: PgPool, config: AppConfig) -> Result<Self> {
        let llm: Arc<dyn LlmClient> =
            Arc::new(OpenAiClient::new(&config.ai).context("Failed to build LLM client")?);
        Self::with_llm(db, config, llm)
    }

    /// Build the state around a specific LLM client
    pub fn with_llm(db: PgPool, config: AppConfig, llm: Arc<dyn LlmClient>) -> Result<Self> {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );
        let google = GoogleVerifier::new(&config.google).context("Failed to build Google client")?;

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt,
            google,
            chatbot: Arc::new(FitnessChatbot::new(llm)),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
