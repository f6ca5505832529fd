//! Intent classification
//!
//! The LLM is asked for a JSON verdict first. Its answer is trusted only when
//! it parses and is confident enough; otherwise keyword scoring decides.

use super::llm::{LlmClient, LlmMessage};
use gymtrack_shared::Intent;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Verdicts below this confidence fall back to keywords
pub const MIN_CONFIDENCE: f64 = 0.3;

/// First flat JSON object in a free-text answer
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("JSON object pattern is valid"));

const CLASSIFIER_PROMPT: &str = "Eres el enrutador de un asistente de gimnasio. \
Clasifica el mensaje del usuario en una sola categoría:\n\
- exercise: ejercicios realizados, técnica, series, repeticiones, pesos\n\
- nutrition: comidas, calorías, macros, dieta, plan de comidas\n\
- progress: evolución, récords personales, comparar semanas\n\
- routine: rutina semanal, qué toca hoy, planificación de entrenamientos\n\
- general: saludos o cualquier otra cosa\n\
Responde SOLO con JSON: {\"intent\": \"<categoría>\", \"confidence\": <0..1>}";

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Llm,
    Keywords,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationSource::Llm => "llm",
            ClassificationSource::Keywords => "keywords",
        }
    }
}

/// Result of classifying one message
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f64,
    pub source: ClassificationSource,
}

#[derive(Debug, Deserialize)]
struct Verdict {
    intent: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Extract `(intent, confidence)` from an LLM answer
///
/// A missing confidence counts as fully confident; values are clamped to 0..=1.
pub fn parse_llm_answer(answer: &str) -> Option<(Intent, f64)> {
    let object = JSON_OBJECT.find(answer)?;
    let verdict: Verdict = serde_json::from_str(object.as_str()).ok()?;
    let intent = Intent::parse(&verdict.intent)?;
    let confidence = verdict.confidence.unwrap_or(1.0);
    if confidence.is_nan() {
        return None;
    }
    Some((intent, confidence.clamp(0.0, 1.0)))
}

/// Keywords per intent, accent-free and lower-case
///
/// Single words match as prefixes of message words, phrases as substrings.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Exercise,
        &[
            "ejercicio", "entren", "gimnasio", "gym", "pesas", "serie", "repeticion", "sentadilla",
            "press", "peso muerto", "dominada", "cardio", "levant", "workout", "exercise", "lift",
            "squat", "bench", "deadlift", "reps",
        ],
    ),
    (
        Intent::Nutrition,
        &[
            "comida", "comer", "comi", "dieta", "caloria", "kcal", "proteina", "carbohidrato",
            "grasa", "macro", "desayuno", "almuerzo", "cena", "merienda", "nutricion", "meal",
            "food", "diet", "calorie", "protein", "carb", "eat",
        ],
    ),
    (
        Intent::Progress,
        &[
            "progreso", "avance", "mejora", "record", "marca", "evolucion", "historial",
            "estadistica", "progress", "improve", "personal best", "history", "stats",
        ],
    ),
    (
        Intent::Routine,
        &[
            "rutina", "toca", "planific", "lunes", "martes", "miercoles", "jueves", "viernes",
            "sabado", "domingo", "routine", "schedule", "today", "split",
        ],
    ),
];

fn strip_accents(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' => 'a',
        'é' | 'è' | 'ë' => 'e',
        'í' | 'ì' | 'ï' => 'i',
        'ó' | 'ò' | 'ö' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        other => other,
    }
}

/// Lower-case, accent-free words of a message
fn normalize(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .chars()
        .map(strip_accents)
        .collect::<String>()
        .split(|c: char| !c.is_alphanumeric() && c != 'ñ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of keyword hits per intent, in `KEYWORDS` order
pub fn keyword_scores(message: &str) -> Vec<(Intent, usize)> {
    let words = normalize(message);
    let joined = format!(" {} ", words.join(" "));

    KEYWORDS
        .iter()
        .map(|(intent, keywords)| {
            let score = keywords
                .iter()
                .filter(|kw| {
                    if kw.contains(' ') {
                        joined.contains(&format!(" {} ", kw))
                    } else {
                        words.iter().any(|w| w.starts_with(*kw))
                    }
                })
                .count();
            (*intent, score)
        })
        .collect()
}

/// Highest keyword score wins; ties go to the earlier intent; no hits is general
pub fn classify_by_keywords(message: &str) -> Intent {
    let mut best = (Intent::General, 0usize);
    for (intent, score) in keyword_scores(message) {
        if score > best.1 {
            best = (intent, score);
        }
    }
    best.0
}

/// LLM-first classifier with keyword fallback
#[derive(Clone)]
pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn classify(&self, message: &str) -> Classification {
        let messages = [LlmMessage::system(CLASSIFIER_PROMPT), LlmMessage::user(message)];

        match self.llm.complete(&messages).await {
            Ok(answer) => match parse_llm_answer(&answer) {
                Some((intent, confidence)) if confidence >= MIN_CONFIDENCE => {
                    debug!(%intent, confidence, "Classified by LLM");
                    return Classification {
                        intent,
                        confidence,
                        source: ClassificationSource::Llm,
                    };
                }
                Some((intent, confidence)) => {
                    debug!(%intent, confidence, "LLM verdict below threshold");
                }
                None => warn!("Unparseable classifier answer"),
            },
            Err(e) => debug!("Classifier LLM unavailable: {}", e),
        }

        Classification {
            intent: classify_by_keywords(message),
            confidence: 0.0,
            source: ClassificationSource::Keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::testing::ScriptedLlm;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_json_object_pattern_finds_first_flat_object() {
        let found = JSON_OBJECT.find(r#"ok {"a": 1} then {"b": 2}"#).map(|m| m.as_str());
        assert_eq!(found, Some(r#"{"a": 1}"#));
    }

    #[rstest]
    #[case(r#"{"intent": "nutrition", "confidence": 0.92}"#, Intent::Nutrition, 0.92)]
    #[case("Claro! {\"intent\":\"rutina\",\"confidence\":0.7} espero ayude", Intent::Routine, 0.7)]
    #[case(r#"{"intent": "Progreso"}"#, Intent::Progress, 1.0)]
    #[case(r#"{"intent": "exercise", "confidence": 4}"#, Intent::Exercise, 1.0)]
    fn test_parse_llm_answer(#[case] answer: &str, #[case] intent: Intent, #[case] confidence: f64) {
        assert_eq!(parse_llm_answer(answer), Some((intent, confidence)));
    }

    #[rstest]
    #[case("no json here")]
    #[case(r#"{"intent": "astrology", "confidence": 0.9}"#)]
    #[case(r#"{"label": "exercise"}"#)]
    #[case(r#"{"intent": {"nested": true}}"#)]
    fn test_parse_llm_answer_rejects(#[case] answer: &str) {
        assert_eq!(parse_llm_answer(answer), None);
    }

    #[rstest]
    #[case("¿Qué ejercicios hice esta semana?", Intent::Exercise)]
    #[case("¿Cuántas calorías llevo hoy?", Intent::Nutrition)]
    #[case("¿Cómo va mi progreso en sentadilla?", Intent::Exercise)]
    #[case("Quiero ver mi récord y mi evolución", Intent::Progress)]
    #[case("¿Qué me toca hoy?", Intent::Routine)]
    #[case("What should I eat for dinner?", Intent::Nutrition)]
    #[case("hola, ¿quién eres?", Intent::General)]
    #[case("", Intent::General)]
    fn test_classify_by_keywords(#[case] message: &str, #[case] expected: Intent) {
        assert_eq!(classify_by_keywords(message), expected);
    }

    #[test]
    fn test_keyword_ties_resolved_in_enum_order() {
        // one exercise hit, one nutrition hit
        assert_eq!(classify_by_keywords("pesas y cena"), Intent::Exercise);
        // one nutrition hit, one routine hit
        assert_eq!(classify_by_keywords("cena del lunes"), Intent::Nutrition);
    }

    #[tokio::test]
    async fn test_classify_uses_confident_llm_verdict() {
        let llm = ScriptedLlm::answering(&[r#"{"intent":"progress","confidence":0.8}"#]);
        let result = IntentClassifier::new(llm).classify("dieta").await;
        assert_eq!(result.intent, Intent::Progress);
        assert_eq!(result.source, ClassificationSource::Llm);
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_low_confidence() {
        let llm = ScriptedLlm::answering(&[r#"{"intent":"progress","confidence":0.1}"#]);
        let result = IntentClassifier::new(llm).classify("quiero cambiar mi dieta").await;
        assert_eq!(result.intent, Intent::Nutrition);
        assert_eq!(result.source, ClassificationSource::Keywords);
    }

    #[tokio::test]
    async fn test_classify_falls_back_when_llm_fails() {
        let result = IntentClassifier::new(ScriptedLlm::failing())
            .classify("¿qué rutina tengo el viernes?")
            .await;
        assert_eq!(result.intent, Intent::Routine);
        assert_eq!(result.source, ClassificationSource::Keywords);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_keyword_classification_never_panics(message in ".{0,200}") {
            let intent = classify_by_keywords(&message);
            prop_assert!(Intent::ALL.contains(&intent));
        }

        #[test]
        fn prop_confidence_is_clamped(confidence in -10.0f64..10.0) {
            let answer = format!(r#"{{"intent":"general","confidence":{}}}"#, confidence);
            let (_, parsed) = parse_llm_answer(&answer).unwrap();
            prop_assert!((0.0..=1.0).contains(&parsed));
        }
    }
}
