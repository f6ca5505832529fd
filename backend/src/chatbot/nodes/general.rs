use super::{ChatNode, FitnessData, NodeContext};
use crate::chatbot::state::AgentState;
use async_trait::async_trait;
use gymtrack_shared::Intent;

const PROMPT: &str = "Eres GymTrack, un asistente de gimnasio amable. Responde en español y \
de forma breve. Si la pregunta no tiene que ver con entrenamiento o nutrición, redirige \
con cortesía hacia lo que puedes hacer.";

const HELP: &str = "Puedo ayudarte con:\n\
• Tus ejercicios recientes: \"¿qué entrené esta semana?\"\n\
• Tu alimentación de hoy: \"¿cuántas calorías me quedan?\"\n\
• Tu progreso: \"¿cómo va mi sentadilla?\"\n\
• Tu rutina: \"¿qué me toca hoy?\"";

/// Greetings, help and anything the other nodes do not cover
pub struct GeneralNode;

#[async_trait]
impl ChatNode for GeneralNode {
    fn intent(&self) -> Intent {
        Intent::General
    }

    fn header(&self) -> &'static str {
        "💬 GymTrack"
    }

    fn system_prompt(&self) -> &'static str {
        PROMPT
    }

    async fn load_context(&self, _data: &dyn FitnessData, _state: &AgentState) -> anyhow::Result<NodeContext> {
        Ok(NodeContext {
            prompt: "(no se necesitan datos del usuario)".to_string(),
            summary: HELP.to_string(),
        })
    }
}
