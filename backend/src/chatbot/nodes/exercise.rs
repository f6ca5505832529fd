use super::{fmt_kg, ChatNode, FitnessData, LoggedExercise, NodeContext};
use crate::chatbot::state::AgentState;
use async_trait::async_trait;
use chrono::Duration;
use gymtrack_shared::Intent;
use std::collections::BTreeSet;

/// Look-back window for recent training
pub const EXERCISE_WINDOW_DAYS: i64 = 14;

/// Lines listed in the fallback summary
const SUMMARY_LINES: usize = 10;

const PROMPT: &str = "Eres un entrenador personal. Responde en español, de forma breve y \
práctica, sobre los ejercicios del usuario: técnica, series, repeticiones y cargas. \
Básate en sus registros recientes y no inventes datos que no aparezcan.";

/// Answers questions about recently performed exercises
pub struct ExerciseNode;

fn describe(log: &LoggedExercise) -> String {
    let mut line = format!("{} {}: {}x{}", log.performed_on, log.exercise_name, log.sets, log.reps);
    if let Some(weight) = log.weight_kg {
        line.push_str(&format!(" @ {} kg", fmt_kg(weight)));
    }
    line
}

pub(crate) fn build_context(logs: &[LoggedExercise]) -> NodeContext {
    if logs.is_empty() {
        return NodeContext {
            prompt: format!("Sin ejercicios registrados en los últimos {} días.", EXERCISE_WINDOW_DAYS),
            summary: format!(
                "No tienes ejercicios registrados en los últimos {} días. Registra tu próximo entrenamiento para empezar a ver tu historial.",
                EXERCISE_WINDOW_DAYS
            ),
        };
    }

    let days: BTreeSet<_> = logs.iter().map(|l| l.performed_on).collect();
    let prompt = logs.iter().map(describe).collect::<Vec<_>>().join("\n");

    let mut summary = format!(
        "En los últimos {} días registraste {} ejercicios en {} días de entrenamiento:\n",
        EXERCISE_WINDOW_DAYS,
        logs.len(),
        days.len()
    );
    for log in logs.iter().take(SUMMARY_LINES) {
        summary.push_str(&format!("• {}\n", describe(log)));
    }
    if logs.len() > SUMMARY_LINES {
        summary.push_str(&format!("… y {} más", logs.len() - SUMMARY_LINES));
    }

    NodeContext { prompt, summary }
}

#[async_trait]
impl ChatNode for ExerciseNode {
    fn intent(&self) -> Intent {
        Intent::Exercise
    }

    fn header(&self) -> &'static str {
        "🏋️ Ejercicio"
    }

    fn system_prompt(&self) -> &'static str {
        PROMPT
    }

    async fn load_context(&self, data: &dyn FitnessData, state: &AgentState) -> anyhow::Result<NodeContext> {
        let since = state.today - Duration::days(EXERCISE_WINDOW_DAYS - 1);
        let logs = data.exercise_logs_between(state.user_id, since, state.today).await?;
        Ok(build_context(&logs))
    }
}
