//! Authentication module
//!
//! JWT-based authentication with argon2 password hashing, Google ID token
//! sign-in and a shared-secret extractor for the Telegram bot.

mod google;
mod jwt;
mod middleware;
mod password;

pub use google::{GoogleIdentity, GoogleVerifier};
pub use jwt::{Claims, JwtService, TokenKind};
pub use middleware::{AuthUser, BotAuth, ACCESS_TOKEN_COOKIE, BOT_TOKEN_HEADER};
pub use password::PasswordService;
