//! GymTrack Shared Library
//!
//! Domain enums, energy/macro calculations, validation and the API types
//! used by both the backend and the Telegram bot.

pub mod health_metrics;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use health_metrics::*;
pub use models::{iso_weekday, weekday_name_es, ChatRole, Intent, MealType};
pub use types::*;
