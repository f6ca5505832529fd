//! Chatbot conversation history

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored chat message
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatMessageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub content: String,
    pub intent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Chat history repository
pub struct ChatRepository;

impl ChatRepository {
    /// The latest `limit` messages, returned oldest first
    pub async fn recent(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<ChatMessageRecord>> {
        let mut records = sqlx::query_as::<_, ChatMessageRecord>(
            r#"
            SELECT id, user_id, role, content, intent, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at DESC, role ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(pool)
        .await?;

        records.reverse();
        Ok(records)
    }

    /// Store a user message and the assistant reply together
    pub async fn append_exchange(
        pool: &PgPool,
        user_id: Uuid,
        message: &str,
        reply: &str,
        intent: &str,
    ) -> Result<()> {
        let mut tx = pool.begin().await?;

        // Same timestamp for both rows; the reply sorts after the question
        let now = Utc::now();
        for (role, content) in [("user", message), ("assistant", reply)] {
            sqlx::query(
                r#"
                INSERT INTO chat_messages (user_id, role, content, intent, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(user_id)
            .bind(role)
            .bind(content)
            .bind(intent)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete the whole conversation
    pub async fn clear(pool: &PgPool, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
