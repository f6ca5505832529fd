//! User service for authentication and user management
//!
//! Password hashing and verification run on the blocking pool; tokens are
//! signed with the keys pre-computed in `AppState`.

use crate::auth::{GoogleIdentity, JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{CreateUser, UserRecord, UserRepository};
use gymtrack_shared::types::{AuthTokens, UserProfile};
use gymtrack_shared::validation::{validate_name, validate_password};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

/// User service for authentication operations
pub struct UserService;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_tokens(jwt_service: &JwtService, user_id: Uuid) -> Result<AuthTokens, ApiError> {
    let access_token = jwt_service
        .generate_access_token(user_id)
        .map_err(ApiError::Internal)?;
    let refresh_token = jwt_service
        .generate_refresh_token(user_id)
        .map_err(ApiError::Internal)?;

    Ok(AuthTokens {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_service.access_token_expiry_secs(),
    })
}

impl UserService {
    /// Register a new user with email and password
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }
        validate_password(password).map_err(ApiError::Validation)?;
        let display_name = display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if let Some(name) = &display_name {
            validate_name("Display name", name).map_err(ApiError::Validation)?;
        }

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            CreateUser {
                email,
                password_hash: Some(password_hash),
                display_name,
                ..CreateUser::default()
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(user_id = %user.id, "User registered");
        issue_tokens(jwt_service, user.id)
    }

    /// Login with email and password
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let user = UserRepository::find_by_email(pool, &normalize_email(email))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        // Google-only accounts have no password
        let hash = user
            .password_hash
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = PasswordService::verify_async(password.to_string(), hash)
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        issue_tokens(jwt_service, user.id)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate(refresh_token, crate::auth::TokenKind::Refresh)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        let user_id = claims
            .user_id()
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        issue_tokens(jwt_service, user_id)
    }

    /// Sign in with a verified Google identity
    ///
    /// Looks the user up by Google subject first, then by email (linking the
    /// subject to the existing account), and creates a password-less account
    /// otherwise.
    pub async fn google_login(
        pool: &PgPool,
        jwt_service: &JwtService,
        identity: GoogleIdentity,
    ) -> Result<AuthTokens, ApiError> {
        if let Some(user) = UserRepository::find_by_google_sub(pool, &identity.subject)
            .await
            .map_err(ApiError::Internal)?
        {
            return issue_tokens(jwt_service, user.id);
        }

        let email = normalize_email(&identity.email);
        let user = match UserRepository::find_by_email(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            Some(existing) => {
                if existing.google_sub.is_some() {
                    return Err(ApiError::Conflict(
                        "Email is linked to another Google account".to_string(),
                    ));
                }
                UserRepository::link_google(pool, existing.id, &identity.subject)
                    .await
                    .map_err(ApiError::Internal)?
            }
            None => {
                let user = UserRepository::create(
                    pool,
                    CreateUser {
                        email,
                        password_hash: None,
                        display_name: identity.name,
                        google_sub: Some(identity.subject),
                    },
                )
                .await
                .map_err(ApiError::Internal)?;
                info!(user_id = %user.id, "User registered with Google");
                user
            }
        };

        issue_tokens(jwt_service, user.id)
    }

    /// Get the profile of the signed-in user
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(to_profile(user))
    }
}

pub(crate) fn to_profile(user: UserRecord) -> UserProfile {
    UserProfile {
        id: user.id.to_string(),
        email: user.email,
        display_name: user.display_name,
        telegram_linked: user.telegram_id.is_some(),
        created_at: user.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn test_issue_tokens_are_bearer() {
        let jwt = JwtService::new("test-secret-that-is-long-enough-123456", 900, 3600);
        let tokens = issue_tokens(&jwt, Uuid::new_v4()).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 900);
        assert_ne!(tokens.access_token, tokens.refresh_token);
    }

    #[test]
    fn test_profile_reports_telegram_link() {
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            password_hash: None,
            display_name: Some("Ana".to_string()),
            google_sub: None,
            telegram_id: Some(42),
            telegram_username: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = to_profile(user);
        assert!(profile.telegram_linked);
        assert_eq!(profile.display_name.as_deref(), Some("Ana"));
    }
}
