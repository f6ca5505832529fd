//! Fitness chatbot
//!
//! A message is classified into an [`Intent`](gymtrack_shared::Intent), then
//! answered by the node for that intent using the user's own data. Every
//! step degrades gracefully when the LLM is unreachable.

pub mod classifier;
pub mod graph;
pub mod llm;
pub mod nodes;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{Classification, ClassificationSource, IntentClassifier};
pub use graph::FitnessChatbot;
pub use llm::{LlmClient, LlmError, LlmMessage, OpenAiClient};
pub use nodes::{FitnessData, PgFitnessData};
pub use state::{AgentState, ChatTurn};
