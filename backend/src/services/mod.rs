//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod chatbot;
pub mod dashboard;
pub mod exercise;
pub mod meal_plan;
pub mod nutrition;
pub mod profile;
pub mod routine;
pub mod telegram;
pub mod tracking;
pub mod user;

pub use chatbot::ChatbotService;
pub use dashboard::DashboardService;
pub use exercise::ExerciseService;
pub use meal_plan::MealPlanService;
pub use nutrition::NutritionService;
pub use profile::ProfileService;
pub use routine::RoutineService;
pub use telegram::TelegramService;
pub use tracking::TrackingService;
pub use user::UserService;
