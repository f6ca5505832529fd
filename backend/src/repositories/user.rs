//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    /// NULL for accounts created through Google sign-in
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub google_sub: Option<String>,
    pub telegram_id: Option<i64>,
    pub telegram_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub google_sub: Option<String>,
}

/// Outcome of binding a Telegram id to a user
#[derive(Debug, Clone)]
pub enum TelegramLinkOutcome {
    Linked(UserRecord),
    /// No unused, unexpired code matched
    InvalidCode,
    /// The Telegram id already belongs to another user
    AlreadyLinked,
}

const USER_COLUMNS: &str = "id, email, password_hash, display_name, google_sub, \
                            telegram_id, telegram_username, created_at, updated_at";

/// Postgres `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name, google_sub)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.display_name)
        .bind(&input.google_sub)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by Google subject
    pub async fn find_by_google_sub(pool: &PgPool, google_sub: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_sub = $1"
        ))
        .bind(google_sub)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by linked Telegram id
    pub async fn find_by_telegram_id(pool: &PgPool, telegram_id: i64) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = $1"
        ))
        .bind(telegram_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Attach a Google subject to an existing email account
    pub async fn link_google(pool: &PgPool, user_id: Uuid, google_sub: &str) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET google_sub = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(google_sub)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Store a fresh link code for a user
    pub async fn create_link_code(
        pool: &PgPool,
        user_id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = pool.begin().await?;

        // Older unused codes stop working once a new one is issued
        sqlx::query(
            r#"
            DELETE FROM telegram_link_codes
            WHERE user_id = $1 AND used_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO telegram_link_codes (code, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(code)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Consume a link code and bind the Telegram id to its user
    pub async fn consume_link_code(
        pool: &PgPool,
        code: &str,
        telegram_id: i64,
        telegram_username: Option<&str>,
    ) -> Result<TelegramLinkOutcome> {
        let mut tx = pool.begin().await?;

        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id FROM telegram_link_codes
            WHERE code = $1 AND used_at IS NULL AND expires_at > NOW()
            FOR UPDATE
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = owner else {
            return Ok(TelegramLinkOutcome::InvalidCode);
        };

        let holder = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM users WHERE telegram_id = $1
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(&mut *tx)
        .await?;

        if matches!(holder, Some(id) if id != user_id) {
            return Ok(TelegramLinkOutcome::AlreadyLinked);
        }

        // a concurrent link for the same Telegram id can still win the unique index
        let user = match sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET telegram_id = $2, telegram_username = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(telegram_id)
        .bind(telegram_username)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Ok(TelegramLinkOutcome::AlreadyLinked),
            Err(e) => return Err(e.into()),
        };

        sqlx::query(
            r#"
            UPDATE telegram_link_codes SET used_at = NOW()
            WHERE code = $1
            "#,
        )
        .bind(code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TelegramLinkOutcome::Linked(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_database_errors_are_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
