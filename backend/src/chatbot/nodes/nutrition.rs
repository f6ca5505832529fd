use super::{ChatNode, FitnessData, NodeContext, NutritionSnapshot};
use crate::chatbot::state::AgentState;
use async_trait::async_trait;
use gymtrack_shared::{Intent, MacroTotals, MealType};

const PROMPT: &str = "Eres un nutricionista deportivo. Responde en español, de forma breve, \
sobre la alimentación del usuario: calorías, macronutrientes y qué le conviene comer. \
Usa lo que ya comió hoy y sus objetivos; no inventes datos.";

/// Answers questions about today's food against the targets
pub struct NutritionNode;

fn macros_line(m: &MacroTotals) -> String {
    format!(
        "{:.0} kcal, {:.0} g proteína, {:.0} g carbohidratos, {:.0} g grasa",
        m.calories, m.protein_g, m.carbs_g, m.fat_g
    )
}

fn meal_label(meal_type: &str) -> &str {
    match MealType::parse(meal_type) {
        Some(MealType::Breakfast) => "Desayuno",
        Some(MealType::Lunch) => "Almuerzo",
        Some(MealType::Snack) => "Merienda",
        Some(MealType::Dinner) => "Cena",
        None => meal_type,
    }
}

pub(crate) fn build_context(snapshot: &NutritionSnapshot) -> NodeContext {
    let mut prompt = format!("Comidas registradas el {}:\n", snapshot.date);
    if snapshot.meals.is_empty() {
        prompt.push_str("(ninguna)\n");
    }
    for meal in &snapshot.meals {
        prompt.push_str(&format!(
            "- {}: {} ({:.0} kcal)\n",
            meal_label(&meal.meal_type),
            meal.description,
            meal.calories
        ));
    }
    prompt.push_str(&format!("Total: {}\n", macros_line(&snapshot.totals)));

    let mut summary = if snapshot.meals.is_empty() {
        "Hoy todavía no registraste comidas.".to_string()
    } else {
        format!(
            "Hoy registraste {} comidas: {}.",
            snapshot.meals.len(),
            macros_line(&snapshot.totals)
        )
    };

    match &snapshot.targets {
        Some(targets) => {
            let remaining = snapshot.totals.remaining_from(targets);
            prompt.push_str(&format!("Objetivo diario: {}\n", macros_line(targets)));
            prompt.push_str(&format!("Restante: {}", macros_line(&remaining)));
            if remaining.calories >= 0.0 {
                summary.push_str(&format!(
                    "\nTe quedan {:.0} kcal y {:.0} g de proteína para llegar a tu objetivo.",
                    remaining.calories,
                    remaining.protein_g.max(0.0)
                ));
            } else {
                summary.push_str(&format!(
                    "\nSuperaste tu objetivo por {:.0} kcal.",
                    -remaining.calories
                ));
            }
        }
        None => {
            prompt.push_str("Sin perfil nutricional, no hay objetivos calculados.");
            summary.push_str("\nCompleta tu perfil nutricional para calcular tus objetivos diarios.");
        }
    }

    NodeContext { prompt, summary }
}

#[async_trait]
impl ChatNode for NutritionNode {
    fn intent(&self) -> Intent {
        Intent::Nutrition
    }

    fn header(&self) -> &'static str {
        "🥗 Nutrición"
    }

    fn system_prompt(&self) -> &'static str {
        PROMPT
    }

    async fn load_context(&self, data: &dyn FitnessData, state: &AgentState) -> anyhow::Result<NodeContext> {
        let snapshot = data.nutrition_on(state.user_id, state.today).await?;
        Ok(build_context(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::nodes::TrackedMeal;
    use chrono::NaiveDate;

    fn snapshot(targets: Option<MacroTotals>) -> NutritionSnapshot {
        NutritionSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            meals: vec![TrackedMeal {
                meal_type: "breakfast".to_string(),
                description: "Avena con plátano".to_string(),
                calories: 450.0,
            }],
            totals: MacroTotals::new(450.0, 20.0, 70.0, 9.0),
            targets,
        }
    }

    #[test]
    fn test_remaining_against_targets() {
        let context = build_context(&snapshot(Some(MacroTotals::new(2000.0, 150.0, 200.0, 60.0))));
        assert!(context.prompt.contains("- Desayuno: Avena con plátano (450 kcal)"));
        assert!(context.summary.contains("Te quedan 1550 kcal y 130 g de proteína"));
    }

    #[test]
    fn test_exceeded_target() {
        let context = build_context(&snapshot(Some(MacroTotals::new(400.0, 10.0, 50.0, 5.0))));
        assert!(context.summary.contains("Superaste tu objetivo por 50 kcal"));
    }

    #[test]
    fn test_without_profile() {
        let context = build_context(&snapshot(None));
        assert!(context.summary.contains("Completa tu perfil nutricional"));
    }
}
