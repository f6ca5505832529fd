//! GymTrack Telegram bot
//!
//! Thin client of the backend bot routes: every command is answered with
//! data fetched over HTTP and rendered as MarkdownV2.

pub mod api;
pub mod backoff;
pub mod commands;
pub mod config;
pub mod format;

pub use api::{ApiClientError, BackendClient};
pub use backoff::Backoff;
pub use commands::{schema, Command};
pub use config::BotConfig;
