use super::{fmt_kg, ChatNode, FitnessData, NodeContext, RoutineItem};
use crate::chatbot::state::AgentState;
use async_trait::async_trait;
use gymtrack_shared::{iso_weekday, weekday_name_es, Intent};

const PROMPT: &str = "Eres un entrenador que organiza la semana del usuario. Responde en \
español sobre su rutina: qué le toca hoy, cómo repartir los grupos musculares y cómo \
ajustar la planificación. Usa la rutina proporcionada.";

/// Answers questions about the weekly routine
pub struct RoutineNode;

fn describe(item: &RoutineItem) -> String {
    let mut line = format!("{} {}x{}", item.exercise_name, item.sets, item.reps);
    if let Some(weight) = item.target_weight_kg {
        line.push_str(&format!(" @ {} kg", fmt_kg(weight)));
    }
    line
}

pub(crate) fn build_context(routine: &[RoutineItem], today: i16) -> NodeContext {
    if routine.is_empty() {
        return NodeContext {
            prompt: "El usuario no tiene rutina semanal.".to_string(),
            summary: "Todavía no tienes una rutina semanal. Puedes crearla desde la web.".to_string(),
        };
    }

    let mut prompt = format!("Hoy es {}. Rutina semanal:\n", weekday_name_es(today));
    for day in 1..=7i16 {
        let items: Vec<_> = routine.iter().filter(|r| r.day_of_week == day).map(describe).collect();
        if !items.is_empty() {
            prompt.push_str(&format!("{}: {}\n", weekday_name_es(day), items.join(", ")));
        }
    }

    let todays: Vec<_> = routine.iter().filter(|r| r.day_of_week == today).collect();
    let summary = if todays.is_empty() {
        format!("Hoy ({}) es día de descanso según tu rutina.", weekday_name_es(today))
    } else {
        let mut text = format!("Hoy ({}) te toca:\n", weekday_name_es(today));
        for item in todays {
            text.push_str(&format!("• {}\n", describe(item)));
        }
        text.trim_end().to_string()
    };

    NodeContext {
        prompt: prompt.trim_end().to_string(),
        summary,
    }
}

#[async_trait]
impl ChatNode for RoutineNode {
    fn intent(&self) -> Intent {
        Intent::Routine
    }

    fn header(&self) -> &'static str {
        "📅 Rutina"
    }

    fn system_prompt(&self) -> &'static str {
        PROMPT
    }

    async fn load_context(&self, data: &dyn FitnessData, state: &AgentState) -> anyhow::Result<NodeContext> {
        let routine = data.weekly_routine(state.user_id).await?;
        Ok(build_context(&routine, iso_weekday(state.today)))
    }
}
