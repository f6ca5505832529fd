//! GymTrack Telegram bot
//!
//! Long-polls Telegram and answers through the backend `/api/v1/bot` routes.

use anyhow::{Context, Result};
use gymtrack_bot::{schema, Backoff, BackendClient, BotConfig, Command};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = BotConfig::load().context("Invalid bot configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.api_base_url,
        "Starting GymTrack bot"
    );

    let api = Arc::new(BackendClient::new(&config).context("Failed to build backend client")?);
    let bot = Bot::new(&config.telegram_token);

    let mut backoff = Backoff::new(
        Duration::from_secs(config.initial_backoff_secs),
        Duration::from_secs(config.max_backoff_secs),
    );
    let me = backoff
        .retry("Telegram get_me", None, || async { bot.get_me().await })
        .await?;
    info!(username = ?me.user.username, "Connected to Telegram");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![api])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot shutdown complete");
    Ok(())
}

fn init_tracing() {
    let production = std::env::var("RUST_ENV").map(|v| v == "production").unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if production {
            "gymtrack_bot=info,teloxide=warn".into()
        } else {
            "gymtrack_bot=debug,teloxide=info".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if production {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}
