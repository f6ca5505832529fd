//! Chatbot conversations

use crate::chatbot::{AgentState, ChatTurn, FitnessChatbot, PgFitnessData};
use crate::error::ApiError;
use crate::repositories::{ChatMessageRecord, ChatRepository};
use chrono::NaiveDate;
use gymtrack_shared::types::{ChatHistoryItem, ChatHistoryResponse, ChatResponse};
use gymtrack_shared::validation::validate_chat_message;
use gymtrack_shared::{ChatRole, Intent};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Messages returned by the history endpoint
pub const HISTORY_PAGE: i64 = 50;

/// Chatbot service
pub struct ChatbotService;

/// Stored rows as conversation turns; rows with an unknown role are skipped
pub(crate) fn to_turns(records: Vec<ChatMessageRecord>) -> Vec<ChatTurn> {
    records
        .into_iter()
        .filter_map(|record| match ChatRole::parse(&record.role) {
            Some(role) => Some(ChatTurn {
                role,
                content: record.content,
            }),
            None => {
                warn!(message_id = %record.id, role = %record.role, "Skipping chat message with unknown role");
                None
            }
        })
        .collect()
}

fn to_history_item(record: ChatMessageRecord) -> Option<ChatHistoryItem> {
    Some(ChatHistoryItem {
        role: ChatRole::parse(&record.role)?,
        content: record.content,
        intent: record.intent.as_deref().and_then(Intent::parse),
        created_at: record.created_at,
    })
}

impl ChatbotService {
    /// Answer one message and store the exchange
    pub async fn send_message(
        db: &PgPool,
        chatbot: &FitnessChatbot,
        history_limit: i64,
        user_id: Uuid,
        message: &str,
        today: NaiveDate,
    ) -> Result<ChatResponse, ApiError> {
        validate_chat_message(message).map_err(ApiError::Validation)?;
        let message = message.trim();

        let history = ChatRepository::recent(db, user_id, history_limit)
            .await
            .map_err(ApiError::Internal)?;

        let data = PgFitnessData::new(db.clone());
        let state = AgentState::new(user_id, message, to_turns(history), today);
        let state = chatbot.handle(&data, state).await;

        let intent = state.intent.unwrap_or(Intent::General);
        let classified_by = state.classified_by.map(|s| s.as_str()).unwrap_or("keywords");
        let reply = state
            .reply
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("chatbot produced no reply")))?;

        ChatRepository::append_exchange(db, user_id, message, &reply, intent.as_str())
            .await
            .map_err(ApiError::Internal)?;

        Ok(ChatResponse {
            reply,
            intent,
            classified_by: classified_by.to_string(),
        })
    }

    pub async fn history(db: &PgPool, user_id: Uuid) -> Result<ChatHistoryResponse, ApiError> {
        let records = ChatRepository::recent(db, user_id, HISTORY_PAGE)
            .await
            .map_err(ApiError::Internal)?;

        Ok(ChatHistoryResponse {
            messages: records.into_iter().filter_map(to_history_item).collect(),
        })
    }

    /// Returns the number of deleted messages
    pub async fn clear(db: &PgPool, user_id: Uuid) -> Result<u64, ApiError> {
        ChatRepository::clear(db, user_id).await.map_err(ApiError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(role: &str, content: &str, intent: Option<&str>) -> ChatMessageRecord {
        ChatMessageRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: role.to_string(),
            content: content.to_string(),
            intent: intent.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_turns_skips_unknown_roles() {
        let turns = to_turns(vec![
            record("user", "hola", Some("general")),
            record("system", "ignored", None),
            record("assistant", "¡Hola!", Some("general")),
        ]);

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[1].content, "¡Hola!");
    }

    #[test]
    fn test_history_item_parses_intent() {
        let item = to_history_item(record("assistant", "Hoy toca pierna", Some("routine"))).unwrap();
        assert_eq!(item.intent, Some(Intent::Routine));

        let item = to_history_item(record("user", "hola", Some("bogus"))).unwrap();
        assert_eq!(item.intent, None);
    }
}
