use super::{fmt_kg, ChatNode, FitnessData, NodeContext, ProgressSummary};
use crate::chatbot::state::AgentState;
use async_trait::async_trait;
use chrono::Duration;
use gymtrack_shared::Intent;

/// Look-back window for progress comparisons
pub const PROGRESS_WINDOW_DAYS: i64 = 30;

/// Exercises listed in the fallback summary
const SUMMARY_LINES: usize = 10;

const PROMPT: &str = "Eres un entrenador que analiza la evolución del usuario. Responde en \
español: destaca mejoras, estancamientos y récords personales usando solo los datos \
proporcionados, y sugiere un siguiente paso concreto.";

/// Answers questions about strength progress
pub struct ProgressNode;

fn change(summary: &ProgressSummary) -> f64 {
    summary.last_max_kg - summary.first_max_kg
}

fn describe(summary: &ProgressSummary) -> String {
    let delta = change(summary);
    let trend = if delta > 0.0 {
        format!("+{} kg", fmt_kg(delta))
    } else if delta < 0.0 {
        format!("-{} kg", fmt_kg(-delta))
    } else {
        "sin cambios".to_string()
    };
    format!(
        "{}: {} sesiones, de {} a {} kg ({}), mejor marca {} kg",
        summary.exercise_name,
        summary.sessions,
        fmt_kg(summary.first_max_kg),
        fmt_kg(summary.last_max_kg),
        trend,
        fmt_kg(summary.best_kg)
    )
}

pub(crate) fn build_context(summaries: &[ProgressSummary]) -> NodeContext {
    if summaries.is_empty() {
        return NodeContext {
            prompt: format!("Sin entrenamientos en los últimos {} días.", PROGRESS_WINDOW_DAYS),
            summary: format!(
                "No hay entrenamientos en los últimos {} días para medir tu progreso.",
                PROGRESS_WINDOW_DAYS
            ),
        };
    }

    let prompt = summaries
        .iter()
        .map(|s| format!("{}; volumen total {} kg", describe(s), fmt_kg(s.volume_kg)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut summary = format!("Tu progreso de los últimos {} días:\n", PROGRESS_WINDOW_DAYS);
    for s in summaries.iter().take(SUMMARY_LINES) {
        summary.push_str(&format!("• {}\n", describe(s)));
    }
    if summaries.len() > SUMMARY_LINES {
        summary.push_str(&format!("… y {} ejercicios más\n", summaries.len() - SUMMARY_LINES));
    }
    if let Some(best) = summaries
        .iter()
        .filter(|s| change(s) > 0.0)
        .max_by(|a, b| change(a).total_cmp(&change(b)))
    {
        summary.push_str(&format!(
            "Tu mayor mejora es en {} (+{} kg).",
            best.exercise_name,
            fmt_kg(change(best))
        ));
    }

    NodeContext {
        prompt,
        summary: summary.trim_end().to_string(),
    }
}

#[async_trait]
impl ChatNode for ProgressNode {
    fn intent(&self) -> Intent {
        Intent::Progress
    }

    fn header(&self) -> &'static str {
        "📈 Progreso"
    }

    fn system_prompt(&self) -> &'static str {
        PROMPT
    }

    async fn load_context(&self, data: &dyn FitnessData, state: &AgentState) -> anyhow::Result<NodeContext> {
        let since = state.today - Duration::days(PROGRESS_WINDOW_DAYS - 1);
        let summaries = data.progress_between(state.user_id, since, state.today).await?;
        Ok(build_context(&summaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, first: f64, last: f64) -> ProgressSummary {
        ProgressSummary {
            exercise_name: name.to_string(),
            sessions: 4,
            first_max_kg: first,
            last_max_kg: last,
            best_kg: first.max(last),
            volume_kg: 5000.0,
        }
    }

    #[test]
    fn test_context_highlights_biggest_gain() {
        let context = build_context(&[
            summary("Sentadilla", 90.0, 100.0),
            summary("Press banca", 60.0, 62.5),
            summary("Remo", 50.0, 47.5),
        ]);
        assert!(context.summary.contains("Sentadilla: 4 sesiones, de 90 a 100 kg (+10 kg)"));
        assert!(context.summary.contains("Remo: 4 sesiones, de 50 a 47.5 kg (-2.5 kg)"));
        assert!(context.summary.ends_with("Tu mayor mejora es en Sentadilla (+10 kg)."));
        assert!(context.prompt.contains("volumen total 5000 kg"));
    }

    #[test]
    fn test_no_gain_no_highlight() {
        let context = build_context(&[summary("Remo", 50.0, 50.0)]);
        assert!(context.summary.contains("sin cambios"));
        assert!(!context.summary.contains("mayor mejora"));
    }

    #[test]
    fn test_summary_lists_at_most_ten_exercises() {
        let summaries: Vec<_> = (0..25).map(|i| summary(&format!("Ejercicio {}", i), 50.0, 55.0)).collect();
        let context = build_context(&summaries);
        assert_eq!(context.summary.matches('•').count(), SUMMARY_LINES);
        assert!(context.summary.contains("… y 15 ejercicios más"));
        assert_eq!(context.prompt.lines().count(), 25);
    }

    #[test]
    fn test_empty_context() {
        assert!(build_context(&[]).summary.starts_with("No hay entrenamientos"));
    }
}
