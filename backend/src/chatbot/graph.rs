//! Chatbot graph: classify, route to a node, answer

use super::classifier::IntentClassifier;
use super::llm::LlmClient;
use super::nodes::{
    run_node, ChatNode, ExerciseNode, FitnessData, GeneralNode, NutritionNode, ProgressNode, RoutineNode,
};
use super::state::AgentState;
use gymtrack_shared::Intent;
use std::sync::Arc;
use tracing::info;

/// Routes each message to the node of its intent
pub struct FitnessChatbot {
    classifier: IntentClassifier,
    llm: Arc<dyn LlmClient>,
    nodes: Vec<Box<dyn ChatNode>>,
}

impl FitnessChatbot {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone()),
            llm,
            nodes: vec![
                Box::new(ExerciseNode),
                Box::new(NutritionNode),
                Box::new(ProgressNode),
                Box::new(RoutineNode),
                Box::new(GeneralNode),
            ],
        }
    }

    fn node_for(&self, intent: Intent) -> &dyn ChatNode {
        self.nodes
            .iter()
            .find(|n| n.intent() == intent)
            .or_else(|| self.nodes.iter().find(|n| n.intent() == Intent::General))
            .map(|n| n.as_ref())
            .unwrap_or(&GeneralNode)
    }

    /// Run one turn; the returned state carries intent, context and reply
    pub async fn handle(&self, data: &dyn FitnessData, mut state: AgentState) -> AgentState {
        let classification = self.classifier.classify(&state.message).await;
        state.intent = Some(classification.intent);
        state.classified_by = Some(classification.source);

        let node = self.node_for(classification.intent);
        run_node(node, self.llm.as_ref(), data, &mut state).await;

        metrics::counter!(
            "chatbot_messages_total",
            "intent" => classification.intent.as_str(),
            "classified_by" => classification.source.as_str()
        )
        .increment(1);

        info!(
            user_id = %state.user_id,
            intent = %classification.intent,
            classified_by = classification.source.as_str(),
            "Chatbot turn handled"
        );

        state
    }
}
