//! Chatbot nodes
//!
//! Each node handles one intent: it loads the user's data it cares about,
//! asks the LLM with its own system prompt and formats the reply. When the
//! LLM is unavailable the node answers with a plain summary of that data.

mod data;
mod exercise;
mod general;
mod nutrition;
mod progress;
mod routine;

pub use data::{
    FitnessData, LoggedExercise, NutritionSnapshot, PgFitnessData, ProgressSummary, RoutineItem,
    TrackedMeal,
};
pub use exercise::ExerciseNode;
pub use general::GeneralNode;
pub use nutrition::NutritionNode;
pub use progress::ProgressNode;
pub use routine::RoutineNode;

use super::llm::{LlmClient, LlmMessage};
use super::state::{AgentState, ChatTurn};
use async_trait::async_trait;
use gymtrack_shared::Intent;
use tracing::{debug, warn};

/// Data a node hands to the LLM, plus the fallback answer built from it
#[derive(Debug, Clone, PartialEq)]
pub struct NodeContext {
    /// Plain-text facts appended to the system prompt
    pub prompt: String,
    /// Markdown answer used when the LLM fails
    pub summary: String,
}

impl NodeContext {
    fn unavailable() -> Self {
        Self {
            prompt: "(no se pudieron cargar los datos del usuario)".to_string(),
            summary: "No pude consultar tus datos en este momento. Inténtalo de nuevo en unos minutos."
                .to_string(),
        }
    }
}

/// One specialised handler of the chatbot
#[async_trait]
pub trait ChatNode: Send + Sync {
    fn intent(&self) -> Intent;

    /// Title shown on top of every reply
    fn header(&self) -> &'static str;

    fn system_prompt(&self) -> &'static str;

    async fn load_context(&self, data: &dyn FitnessData, state: &AgentState) -> anyhow::Result<NodeContext>;
}

/// Markdown reply with the node header
pub fn format_reply(header: &str, body: &str) -> String {
    format!("*{}*\n\n{}", header, body.trim())
}

/// Run a node and store its context and reply in the state
pub async fn run_node(node: &dyn ChatNode, llm: &dyn LlmClient, data: &dyn FitnessData, state: &mut AgentState) {
    let context = match node.load_context(data, state).await {
        Ok(context) => context,
        Err(e) => {
            warn!(intent = %node.intent(), "Failed to load chatbot context: {:#}", e);
            NodeContext::unavailable()
        }
    };

    let mut messages = Vec::with_capacity(state.history.len() + 2);
    messages.push(LlmMessage::system(format!(
        "{}\n\nHoy es {}. Datos del usuario:\n{}",
        node.system_prompt(),
        state.today,
        context.prompt
    )));
    messages.extend(state.history.iter().map(ChatTurn::to_llm_message));
    messages.push(LlmMessage::user(state.message.clone()));

    let body = match llm.complete(&messages).await {
        Ok(answer) => answer,
        Err(e) => {
            debug!(intent = %node.intent(), "LLM unavailable, using summary: {}", e);
            context.summary.clone()
        }
    };

    state.reply = Some(format_reply(node.header(), &body));
    state.context = Some(context.prompt);
}

/// `12.5` -> "12.5", `100.0` -> "100"
pub(crate) fn fmt_kg(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::testing::{FakeFitnessData, ScriptedLlm};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn state(message: &str) -> AgentState {
        AgentState::new(
            Uuid::new_v4(),
            message,
            vec![ChatTurn {
                role: gymtrack_shared::ChatRole::User,
                content: "hola".to_string(),
            }],
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        )
    }

    #[test]
    fn test_fmt_kg() {
        assert_eq!(fmt_kg(100.0), "100");
        assert_eq!(fmt_kg(62.5), "62.5");
        assert_eq!(fmt_kg(62.46), "62.5");
    }

    #[tokio::test]
    async fn test_run_node_sends_prompt_history_and_message() {
        let llm = ScriptedLlm::answering(&["Vas bien."]);
        let data = FakeFitnessData::default();
        let mut st = state("¿qué tal voy?");

        run_node(&GeneralNode, llm.as_ref(), &data, &mut st).await;

        assert_eq!(st.reply.as_deref(), Some("*💬 GymTrack*\n\nVas bien."));
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        let sent = &calls[0];
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].role, "system");
        assert!(sent[0].content.contains("2024-03-04"));
        assert_eq!(sent[1], LlmMessage::user("hola"));
        assert_eq!(sent[2], LlmMessage::user("¿qué tal voy?"));
    }

    #[tokio::test]
    async fn test_run_node_falls_back_to_summary() {
        let data = FakeFitnessData::default();
        let mut st = state("¿qué entrené?");

        run_node(&ExerciseNode, ScriptedLlm::failing().as_ref(), &data, &mut st).await;

        let reply = st.reply.unwrap();
        assert!(reply.starts_with("*🏋️ Ejercicio*"));
        assert!(reply.contains("No tienes ejercicios registrados"));
    }

    #[tokio::test]
    async fn test_run_node_survives_data_errors() {
        let data = FakeFitnessData::broken();
        let mut st = state("¿qué entrené?");

        run_node(&ExerciseNode, ScriptedLlm::failing().as_ref(), &data, &mut st).await;

        assert!(st.reply.unwrap().contains("No pude consultar tus datos"));
    }
}
