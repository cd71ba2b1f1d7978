//! Shared test doubles for the integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use excel_interview::storage::Database;
use excel_interview::{
    EngineSettings, InMemorySessionStore, InterviewEngine, SessionStore, SqliteSessionStore,
};
use excel_interview_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};

pub fn configured() -> ProviderConfig {
    ProviderConfig {
        api_key: Some("test-key".to_string()),
        ..Default::default()
    }
}

pub fn text(body: impl Into<String>) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::from_text(body, "mock-model"))
}

pub fn unavailable() -> LlmResult<LlmResponse> {
    Err(LlmError::ServerError {
        message: "upstream unavailable".to_string(),
        status: Some(503),
    })
}

/// Replies from a fixed queue, front first. An empty queue is an error.
pub struct MockLlmProvider {
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    config: ProviderConfig,
}

impl MockLlmProvider {
    pub fn with_responses(responses: Vec<LlmResult<LlmResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            config: configured(),
        }
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        _messages: Vec<Message>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::Other {
                message: "no more mock responses".to_string(),
            })
        } else {
            responses.remove(0)
        }
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Every call fails as if the gateway were down
pub struct FailingProvider {
    config: ProviderConfig,
    pub calls: AtomicUsize,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self {
            config: configured(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            config: ProviderConfig::default(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn model(&self) -> &str {
        "none"
    }

    async fn send_message(
        &self,
        _messages: Vec<Message>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::NetworkError {
            message: "connection refused".to_string(),
        })
    }

    async fn health_check(&self) -> LlmResult<()> {
        Err(LlmError::NetworkError {
            message: "connection refused".to_string(),
        })
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Answers only after a long delay
pub struct SlowProvider {
    config: ProviderConfig,
    delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            config: configured(),
            delay,
        }
    }
}

#[async_trait]
impl LlmProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn model(&self) -> &str {
        "slow-model"
    }

    async fn send_message(
        &self,
        _messages: Vec<Message>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        tokio::time::sleep(self.delay).await;
        text("far too late")
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Plays a cooperative interviewer: picks the reply by the kind of call,
/// recognised from the system message.
pub struct InterviewerProvider {
    config: ProviderConfig,
    depth: f64,
    overall: f64,
}

impl InterviewerProvider {
    /// Every evaluation reports `depth` and `overall` and offers follow-up topics
    pub fn new(depth: f64, overall: f64) -> Self {
        Self {
            config: configured(),
            depth,
            overall,
        }
    }
}

#[async_trait]
impl LlmProvider for InterviewerProvider {
    fn name(&self) -> &'static str {
        "interviewer"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let system = messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if system.contains("analyze candidate introductions") {
            return text(intro_analysis_json());
        }
        if system.contains("skills evaluator") {
            return text(format!(
                "Here is my evaluation:\n```json\n{}\n```",
                evaluation_json(self.depth, self.overall)
            ));
        }
        if system.contains("assessment reports") {
            return text(
                json!({
                    "engagement_analysis": {"participation_level": "high"},
                    "strengths": ["Confident with lookups"],
                    "final_feedback": "A strong, well-rounded performance."
                })
                .to_string(),
            );
        }
        if system.contains("concluding") {
            return text("Thank you, it was a pleasure. Your report is ready.");
        }
        text("Nice answer! How would you combine INDEX and MATCH for a two-way lookup?")
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn intro_analysis_json() -> String {
    json!({
        "experience_level": "advanced",
        "primary_use_cases": ["financial modelling"],
        "mentioned_skills": ["pivot tables", "VLOOKUP", "Power Query"],
        "confidence_indicators": ["5 years", "daily use", "trains colleagues"],
        "areas_to_explore": ["VBA", "Power Pivot", "dynamic arrays", "charts"],
        "suggested_starting_difficulty": "hard",
        "personality_traits": ["detail oriented"],
        "next_question_focus": "automation"
    })
    .to_string()
}

pub fn evaluation_json(depth: f64, overall: f64) -> String {
    json!({
        "technical_accuracy": {"score": overall, "reasoning": "accurate"},
        "depth_of_knowledge": {"score": depth, "indicators": ["edge cases"]},
        "communication_clarity": {"score": 80, "strengths": ["structured"]},
        "practical_understanding": {"score": 75, "examples": ["sales data"]},
        "overall_score": overall,
        "key_strengths": ["Clear reasoning", "Practical examples", "Knows shortcuts"],
        "areas_for_improvement": ["Mention error handling"],
        "follow_up_suggestions": ["Ask about array formulas"],
        "difficulty_adjustment": "maintain",
        "engagement_level": "high",
        "next_focus_area": "automation",
        "personalized_feedback": "Solid answer with good examples."
    })
    .to_string()
}

pub fn settings(total_questions: u32) -> EngineSettings {
    EngineSettings {
        total_questions,
        gateway_timeout: Duration::from_secs(5),
        ..EngineSettings::default()
    }
}

/// One fresh instance of every session store implementation
pub fn stores() -> Vec<Arc<dyn SessionStore>> {
    let db = Database::new_in_memory().unwrap();
    vec![
        Arc::new(InMemorySessionStore::new()),
        Arc::new(SqliteSessionStore::new(&db)),
    ]
}

pub fn engine_on(
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn LlmProvider>,
    total_questions: u32,
) -> InterviewEngine {
    InterviewEngine::new(store, provider, settings(total_questions))
}

pub fn engine_with(provider: Arc<dyn LlmProvider>, total_questions: u32) -> InterviewEngine {
    engine_on(Arc::new(InMemorySessionStore::new()), provider, total_questions)
}

pub const INTRODUCTION: &str = "I'm a financial analyst with five years of daily Excel use. \
I build pivot tables, use VLOOKUP and Power Query, and I train colleagues on modelling.";
