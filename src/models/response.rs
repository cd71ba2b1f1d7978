//! Response Types
//!
//! Shapes returned by the interview engine to its callers.

use serde::{Deserialize, Serialize};

use super::report::Report;
use super::session::{Difficulty, SessionState};

/// Conversational stage reported alongside each message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStage {
    Introduction,
    TechnicalAssessment,
    FollowUpExploration,
    AdaptiveQuestioning,
    Completed,
}

/// What the interview has learned about the candidate so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateInsights {
    pub experience_level: String,
    pub focus_areas: Vec<String>,
    /// "high" or "moderate"
    pub confidence: String,
}

/// Short view of the evaluation that produced the current message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub score: f64,
    pub strengths: Vec<String>,
    pub focus_area: Option<String>,
}

/// Engine reply to `start_interview` and `process_response`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub message: String,
    pub state: SessionState,
    pub stage: InterviewStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_insights: Option<CandidateInsights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_summary: Option<EvaluationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl TurnResponse {
    pub fn new(message: impl Into<String>, state: SessionState, stage: InterviewStage) -> Self {
        Self {
            message: message.into(),
            state,
            stage,
            question_number: None,
            total_questions: None,
            candidate_insights: None,
            evaluation_summary: None,
            report: None,
            guidance: None,
        }
    }

    pub fn with_progress(mut self, question_number: u32, total_questions: u32) -> Self {
        self.question_number = Some(question_number);
        self.total_questions = Some(total_questions);
        self
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = Some(guidance.into());
        self
    }
}

/// Progress snapshot of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub state: SessionState,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub current_question_index: u32,
    /// Running average of per-answer scores, 0 when nothing was answered
    pub current_score: f64,
    pub difficulty: Difficulty,
    pub follow_ups_used: u32,
}

/// Outcome of a report lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum ReportLookup {
    Ready(Box<Report>),
    /// The session has not reached COMPLETED yet
    NotCompleted,
    /// The session is completed but no report was stored
    Missing,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub service: String,
    pub gateway_configured: bool,
    /// The gateway endpoint answered its health check
    pub gateway_reachable: bool,
    pub store: bool,
    pub active_sessions: usize,
}

impl HealthStatus {
    pub fn new(
        gateway_configured: bool,
        gateway_reachable: bool,
        store: bool,
        active_sessions: usize,
    ) -> Self {
        let status = if gateway_configured && gateway_reachable && store {
            "healthy"
        } else {
            "degraded"
        };
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "excel-interview".to_string(),
            gateway_configured,
            gateway_reachable,
            store,
            active_sessions,
        }
    }
}
