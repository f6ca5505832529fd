//! Telegram account linking

use crate::error::ApiError;
use crate::repositories::{TelegramLinkOutcome, UserRecord, UserRepository};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};
use gymtrack_shared::types::{BotLinkRequest, BotLinkResponse, LinkCodeResponse};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Characters of a link code; no 0/O or 1/I
pub const LINK_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ23456789";
pub const LINK_CODE_LEN: usize = 6;

/// Telegram service
pub struct TelegramService;

pub(crate) fn generate_link_code() -> String {
    let mut bytes = [0u8; LINK_CODE_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| LINK_CODE_ALPHABET[*b as usize % LINK_CODE_ALPHABET.len()] as char)
        .collect()
}

/// Codes are typed by hand, so case and surrounding spaces are ignored
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl TelegramService {
    /// Issue a new link code; earlier unused codes stop working
    pub async fn create_link_code(db: &PgPool, user_id: Uuid, ttl_secs: i64) -> Result<LinkCodeResponse, ApiError> {
        let code = generate_link_code();
        let expires_at = Utc::now() + Duration::seconds(ttl_secs);

        UserRepository::create_link_code(db, user_id, &code, expires_at)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user_id, "Telegram link code issued");
        Ok(LinkCodeResponse { code, expires_at })
    }

    /// Bind a Telegram id to the owner of a link code
    pub async fn link(db: &PgPool, req: BotLinkRequest) -> Result<BotLinkResponse, ApiError> {
        let code = normalize_code(&req.code);
        if code.len() != LINK_CODE_LEN {
            return Err(ApiError::BadRequest("Invalid or expired link code".to_string()));
        }

        let outcome = UserRepository::consume_link_code(db, &code, req.telegram_id, req.telegram_username.as_deref())
            .await
            .map_err(ApiError::Internal)?;

        match outcome {
            TelegramLinkOutcome::Linked(user) => {
                info!(user_id = %user.id, telegram_id = req.telegram_id, "Telegram account linked");
                Ok(BotLinkResponse {
                    user_id: user.id.to_string(),
                    email: user.email,
                    display_name: user.display_name,
                })
            }
            TelegramLinkOutcome::InvalidCode => Err(ApiError::BadRequest("Invalid or expired link code".to_string())),
            TelegramLinkOutcome::AlreadyLinked => Err(ApiError::Conflict(
                "This Telegram account is already linked to another user".to_string(),
            )),
        }
    }

    /// User bound to a Telegram id
    pub async fn user_by_telegram_id(db: &PgPool, telegram_id: i64) -> Result<UserRecord, ApiError> {
        UserRepository::find_by_telegram_id(db, telegram_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Account not linked".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  ab3k9z "), "AB3K9Z");
    }

    proptest! {
        #[test]
        fn prop_link_codes_use_the_alphabet(_seed in 0u8..50) {
            let code = generate_link_code();
            prop_assert_eq!(code.len(), LINK_CODE_LEN);
            prop_assert!(code.bytes().all(|b| LINK_CODE_ALPHABET.contains(&b)));
        }
    }
}
