//! Test doubles for the chatbot seams

use super::llm::{LlmClient, LlmError, LlmMessage};
use super::nodes::{FitnessData, LoggedExercise, NutritionSnapshot, ProgressSummary, RoutineItem};
use async_trait::async_trait;
use chrono::NaiveDate;
use gymtrack_shared::MacroTotals;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// LLM that replays canned answers and records what it was sent
pub struct ScriptedLlm {
    answers: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<LlmMessage>>>,
    fail: bool,
}

impl ScriptedLlm {
    /// Answers in order, then reports an empty answer
    pub fn answering(answers: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    /// Every call fails
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn calls(&self) -> Vec<Vec<LlmMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, messages: &[LlmMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(LlmError::Transport("connection refused".to_string()));
        }
        self.answers.lock().unwrap().pop_front().ok_or(LlmError::EmptyAnswer)
    }
}

/// In-memory fitness data
#[derive(Default)]
pub struct FakeFitnessData {
    pub logs: Vec<LoggedExercise>,
    pub targets: Option<MacroTotals>,
    pub progress: Vec<ProgressSummary>,
    pub routine: Vec<RoutineItem>,
    pub broken: bool,
}

impl FakeFitnessData {
    /// Every read fails
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.broken {
            anyhow::bail!("database is down");
        }
        Ok(())
    }
}

#[async_trait]
impl FitnessData for FakeFitnessData {
    async fn exercise_logs_between(
        &self,
        _user_id: Uuid,
        since: NaiveDate,
        until: NaiveDate,
    ) -> anyhow::Result<Vec<LoggedExercise>> {
        self.check()?;
        Ok(self
            .logs
            .iter()
            .filter(|l| (since..=until).contains(&l.performed_on))
            .cloned()
            .collect())
    }

    async fn nutrition_on(&self, _user_id: Uuid, date: NaiveDate) -> anyhow::Result<NutritionSnapshot> {
        self.check()?;
        Ok(NutritionSnapshot {
            date,
            meals: Vec::new(),
            totals: MacroTotals::default(),
            targets: self.targets,
        })
    }

    async fn progress_between(
        &self,
        _user_id: Uuid,
        _since: NaiveDate,
        _until: NaiveDate,
    ) -> anyhow::Result<Vec<ProgressSummary>> {
        self.check()?;
        Ok(self.progress.clone())
    }

    async fn weekly_routine(&self, _user_id: Uuid) -> anyhow::Result<Vec<RoutineItem>> {
        self.check()?;
        Ok(self.routine.clone())
    }
}
