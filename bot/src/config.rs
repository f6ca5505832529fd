//! Bot configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Token issued by @BotFather
    pub telegram_token: String,
    /// Backend root, without the `/api/v1` suffix
    pub api_base_url: String,
    /// Shared secret sent as `X-Bot-Token`
    pub bot_api_token: String,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            api_base_url: "http://localhost:8080".to_string(),
            bot_api_token: "development-bot-token".to_string(),
            initial_backoff_secs: 1,
            max_backoff_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

impl BotConfig {
    /// Load configuration from defaults and environment
    ///
    /// e.g. `GT_BOT__TELEGRAM_TOKEN=123:abc` sets `telegram_token`.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&BotConfig::default())?)
            .add_source(
                config::Environment::with_prefix("GT_BOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: BotConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.trim().is_empty() {
            anyhow::bail!("GT_BOT__TELEGRAM_TOKEN is required");
        }
        if self.initial_backoff_secs == 0 || self.max_backoff_secs < self.initial_backoff_secs {
            anyhow::bail!("Backoff must start above zero and not exceed its maximum");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_needs_a_token() {
        let config = BotConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_backoff_bounds() {
        let mut config = BotConfig {
            telegram_token: "123:abc".to_string(),
            ..BotConfig::default()
        };
        assert!(config.validate().is_ok());

        config.max_backoff_secs = 0;
        assert!(config.validate().is_err());
    }
}
