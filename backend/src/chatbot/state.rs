//! State threaded through one chatbot turn

use super::classifier::ClassificationSource;
use super::llm::LlmMessage;
use chrono::NaiveDate;
use gymtrack_shared::{ChatRole, Intent};
use uuid::Uuid;

/// A previous message of the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn to_llm_message(&self) -> LlmMessage {
        match self.role {
            ChatRole::User => LlmMessage::user(self.content.clone()),
            ChatRole::Assistant => LlmMessage::assistant(self.content.clone()),
        }
    }
}

/// Everything one turn knows, filled in step by step
///
/// `intent` and `classified_by` are set by the classifier, `context` and
/// `reply` by the node that handles the message.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub user_id: Uuid,
    pub message: String,
    /// Oldest first
    pub history: Vec<ChatTurn>,
    /// Reference date for "today" and the look-back windows
    pub today: NaiveDate,
    pub intent: Option<Intent>,
    pub classified_by: Option<ClassificationSource>,
    pub context: Option<String>,
    pub reply: Option<String>,
}

impl AgentState {
    pub fn new(user_id: Uuid, message: impl Into<String>, history: Vec<ChatTurn>, today: NaiveDate) -> Self {
        Self {
            user_id,
            message: message.into(),
            history,
            today,
            intent: None,
            classified_by: None,
            context: None,
            reply: None,
        }
    }
}
